//! Access control list middleware for the back-office server.
//! This middleware can be placed on any route or service.
//!
//! It resolves the caller's role and checks it against the single capability the route requires. If the role grants
//! the capability, the [`AuthorizedIdentity`](backoffice_engine::db_types::AuthorizedIdentity) is stored in the
//! request extensions and the request continues. Otherwise a 403 Forbidden response is returned.
//!
//! The middleware reuses the identity left behind by the authentication middleware when there is one, and
//! authenticates the request itself when there isn't.

use std::{marker::PhantomData, rc::Rc};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use backoffice_engine::{db_types::Capability, traits::AuthManagement};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::*;

use crate::auth::authorize_request;

pub struct AclMiddlewareFactory<A> {
    required: Capability,
    _backend: PhantomData<fn() -> A>,
}

impl<A> AclMiddlewareFactory<A> {
    pub fn new(required: Capability) -> Self {
        AclMiddlewareFactory { required, _backend: PhantomData }
    }
}

impl<S, B, A> Transform<S, ServiceRequest> for AclMiddlewareFactory<A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: AuthManagement + 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B>>;
    type Transform = AclMiddlewareService<S, A>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required: self.required, service: Rc::new(service), _backend: PhantomData })
    }
}

pub struct AclMiddlewareService<S, A> {
    required: Capability,
    service: Rc<S>,
    _backend: PhantomData<fn() -> A>,
}

impl<S, B, A> Service<ServiceRequest> for AclMiddlewareService<S, A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: AuthManagement + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = self.required;
        Box::pin(async move {
            let authorized = authorize_request::<A>(req.request(), required).await;
            match authorized {
                Ok(authorized) => {
                    trace!("🔐️ {} granted for {}", required, req.path());
                    req.extensions_mut().insert(authorized.identity.clone());
                    req.extensions_mut().insert(authorized);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                },
                Err(e) => Ok(req.error_response(e).map_into_right_body()),
            }
        })
    }
}
