//! Rate limiting middleware. Requests are keyed by the client's IP address, as determined by
//! [`get_remote_ip`](crate::helpers::get_remote_ip), and refused with 429 once the client has used up its window.

use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::{config::ServerOptions, errors::ServerError, helpers::get_remote_ip, rate_limit::RateLimiter};

pub struct RateLimitMiddlewareFactory {
    limiter: Arc<dyn RateLimiter>,
    options: ServerOptions,
}

impl RateLimitMiddlewareFactory {
    pub fn new(limiter: Arc<dyn RateLimiter>, options: ServerOptions) -> Self {
        Self { limiter, options }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B>>;
    type Transform = RateLimitMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            limiter: Arc::clone(&self.limiter),
            options: self.options,
            service: Rc::new(service),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    limiter: Arc<dyn RateLimiter>,
    options: ServerOptions,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let ip = get_remote_ip(req.request(), self.options.use_x_forwarded_for, self.options.use_forwarded);
        let key = match ip {
            Some(ip) => format!("ip:{ip}"),
            None => "ip:unknown".to_string(),
        };
        if self.limiter.allow(&key) {
            let fut = self.service.call(req);
            Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
        } else {
            debug!("💻️ Rate limit exceeded for {key} on {}", req.path());
            let err = ServerError::TooManyRequests("Too many requests. Please slow down and try again later.".into());
            Box::pin(async move { Ok(req.error_response(err).map_into_right_body()) })
        }
    }
}
