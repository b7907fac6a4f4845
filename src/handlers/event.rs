use actix_web::{get, post, web, HttpResponse};

use crate::{
   db::Store,
   dto::{CreateEventRequest, EventIdRequest},
   errors::AppError,
   service::{self, auth::UserAuthData},
};

#[get("")]
pub async fn get_all(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
   let events = service::event::get_all(store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(events))
}

#[post("/create")]
pub async fn create(
   user: UserAuthData,
   dto: web::Json<CreateEventRequest>,
   store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
   let event = service::event::create(user.user_id, dto.into_inner(), store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(event))
}

#[get("/created")]
pub async fn get_created(user: UserAuthData, store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
   let events = service::event::get_created(user.user_id, store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(events))
}

#[post("/join")]
pub async fn join(
   user: UserAuthData,
   dto: web::Json<EventIdRequest>,
   store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
   let event_id = dto.event_id()?;
   let response = service::event::join(event_id, user.user_id, store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(response))
}

#[get("/joined")]
pub async fn get_joined(user: UserAuthData, store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
   let events = service::event::get_joined(user.user_id, store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(events))
}

#[post("/unjoin")]
pub async fn unjoin(
   user: UserAuthData,
   dto: web::Json<EventIdRequest>,
   store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
   let event_id = dto.event_id()?;
   let response = service::event::unjoin(event_id, user.user_id, store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(response))
}

#[post("/cancel")]
pub async fn cancel(
   user: UserAuthData,
   dto: web::Json<EventIdRequest>,
   store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
   let event_id = dto.event_id()?;
   let response = service::event::cancel(event_id, user.user_id, store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(response))
}

#[get("/{id}")]
pub async fn get_by_id(
   _user: UserAuthData,
   id: web::Path<i32>,
   store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
   let event = service::event::get_by_id(id.into_inner(), store.get_ref()).await?;
   Ok(HttpResponse::Ok().json(event))
}

/// Literal paths are registered before `/{id}` so they win the match.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
   cfg.service(get_all)
      .service(create)
      .service(get_created)
      .service(join)
      .service(get_joined)
      .service(unjoin)
      .service(cancel)
      .service(get_by_id);
}
