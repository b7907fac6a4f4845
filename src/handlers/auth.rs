use actix_web::{get, post, web, HttpResponse, Responder};

use crate::{
   config::Config,
   db::Store,
   dto::{LoginRequest, RegisterRequest},
   errors::AppError,
   service,
};

#[post("/register")]
pub async fn register(
   dto: web::Json<RegisterRequest>,
   config: web::Data<Config>,
   store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
   let response = service::user::register(dto.into_inner(), config.token_ttl_secs, store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(response))
}

#[post("/login")]
pub async fn login(
   dto: web::Json<LoginRequest>,
   config: web::Data<Config>,
   store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
   let response = service::user::login(dto.into_inner(), config.token_ttl_secs, store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(response))
}

#[get("/health")]
pub async fn health() -> impl Responder {
   HttpResponse::Ok().body("OK")
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
   cfg.service(register).service(login);
}
