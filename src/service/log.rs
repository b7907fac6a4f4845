use env_logger::{Builder, Env};
use log::{info, warn, Level};
use std::future::{ready, Ready};
use std::io::Write;
use std::time::Instant;
use actix_web::{
   dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
   Error,
};
use futures_util::future::LocalBoxFuture;

/// Logs one line per request and one per response with status and latency.
pub struct LoggerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
   S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
   S::Future: 'static,
   B: 'static,
{
   type Response = ServiceResponse<B>;
   type Error = Error;
   type InitError = ();
   type Transform = LoggerMiddlewareService<S>;
   type Future = Ready<Result<Self::Transform, Self::InitError>>;

   fn new_transform(&self, service: S) -> Self::Future {
      ready(Ok(LoggerMiddlewareService { service }))
   }
}

pub struct LoggerMiddlewareService<S> {
   service: S
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
   type Response = ServiceResponse<B>;
   type Error = Error;
   type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

   forward_ready!(service);

   fn call(&self, req: ServiceRequest) -> Self::Future {
      let started = Instant::now();
      let method = req.method().clone();
      let path = req.path().to_owned();
      info!("--> {} {}", method, path);
      let fut = self.service.call(req);

      Box::pin(async move {
         let res = fut.await?;
         let status = res.status();
         let elapsed = started.elapsed().as_millis();
         if status.is_server_error() {
            warn!("<-- {} {} {} ({} ms)", method, path, status, elapsed);
         } else {
            info!("<-- {} {} {} ({} ms)", method, path, status, elapsed);
         }
         Ok(res)
      })
   }
}

fn level_color(level: Level) -> &'static str {
   match level {
      Level::Error => "\x1b[31;1m",
      Level::Warn => "\x1b[33;1m",
      Level::Info => "\x1b[32;1m",
      Level::Debug => "\x1b[34;1m",
      Level::Trace => "\x1b[35;1m",
   }
}

/// Reads `RUST_LOG`, defaulting to `info`.
pub fn init_logger() {
   Builder::from_env(Env::default().default_filter_or("info"))
   .format(|buf, record| {
      writeln!(
         buf,
         "{}{} [{}] {}\x1b[0m",
         level_color(record.level()),
         record.level(),
         record.target(),
         record.args()
      )
   })
   .init()
}
