//! HTTP access log middleware
//!
//! Logs one line per request (method, path, status, latency) after the
//! response is produced. Runs inside the request-id span, so every line
//! carries the request id.

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::time::Instant;
use tracing::{info, warn};

/// Access log middleware factory
#[derive(Clone, Default)]
pub struct AccessLogMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AccessLogMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessLogService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessLogService {
            service: Rc::new(service),
        }))
    }
}

pub struct AccessLogService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AccessLogService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let start = Instant::now();

        let method = req.method().to_string();
        let path = req.path().to_string();
        let peer = req
            .connection_info()
            .peer_addr()
            .unwrap_or("-")
            .to_string();

        Box::pin(async move {
            let result = srv.call(req).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(response) if response.status().is_server_error() => {
                    warn!(
                        "{} {} {} from {} in {:?}",
                        method,
                        path,
                        response.status().as_u16(),
                        peer,
                        elapsed
                    );
                }
                Ok(response) => {
                    info!(
                        "{} {} {} from {} in {:?}",
                        method,
                        path,
                        response.status().as_u16(),
                        peer,
                        elapsed
                    );
                }
                Err(e) => {
                    warn!("{} {} failed from {} in {:?}: {}", method, path, peer, elapsed, e);
                }
            }

            result
        })
    }
}
