use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    FromRequest, HttpMessage, HttpRequest,
};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use log::debug;

use crate::{db::Store, errors::AppError};

/// Authenticated caller. Taking it as a handler argument makes the route
/// require a valid bearer token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserAuthData {
    pub user_id: i32,
}

/// Result of resolving the `Authorization` header, stored in request extensions.
#[derive(Debug, Clone)]
enum AuthState {
    Authenticated(UserAuthData),
    Rejected(AppError),
}

/// Maps a bearer token to its user id. Unknown and expired tokens are rejected.
pub async fn resolve_token(token: &str, store: &dyn Store, now: DateTime<Utc>) -> Result<i32, AppError> {
    let token = store
        .find_token(token)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid token"))?;
    if token.is_expired(now) {
        return Err(AppError::unauthorized("Token expired"));
    }
    Ok(token.user_id)
}

pub fn parse_bearer(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub struct AuthMiddleware {
    pub store: Arc<dyn Store>,
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            store: Arc::clone(&self.store),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    store: Arc<dyn Store>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let store = Arc::clone(&self.store);
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer)
            .map(str::to_owned);

        Box::pin(async move {
            if let Some(token) = token {
                let state = match resolve_token(&token, store.as_ref(), Utc::now()).await {
                    Ok(user_id) => AuthState::Authenticated(UserAuthData { user_id }),
                    Err(err) => {
                        debug!("rejected bearer token: {}", err);
                        AuthState::Rejected(err)
                    }
                };
                req.extensions_mut().insert(state);
            }
            service.call(req).await
        })
    }
}

impl FromRequest for UserAuthData {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.extensions().get::<AuthState>() {
            Some(AuthState::Authenticated(user)) => Ok(*user),
            Some(AuthState::Rejected(err)) => Err(err.clone()),
            None => Err(AppError::unauthorized("No token provided")),
        };
        ready(result)
    }
}
