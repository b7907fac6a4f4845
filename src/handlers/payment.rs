use actix_web::{get, post, web, HttpResponse};

use crate::{
   db::Store,
   dto::ChargeBalanceRequest,
   errors::AppError,
   service::{self, auth::UserAuthData},
};

#[post("/charge")]
pub async fn charge(
   user: UserAuthData,
   dto: web::Json<ChargeBalanceRequest>,
   store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
   let amount = dto
      .amount
      .ok_or_else(|| AppError::validation("Recharge amount must be greater than $0"))?;
   let response = service::payment::charge_balance(user.user_id, amount, store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(response))
}

#[get("/balance")]
pub async fn balance(user: UserAuthData, store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
   let balance = service::payment::get_balance(user.user_id, store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(balance))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
   cfg.service(charge).service(balance);
}
