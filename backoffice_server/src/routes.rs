//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
//!
//! ## Access control
//! Routes declared with `where authenticated` need a current access token. Routes declared with
//! `where requires <Capability>` additionally need a role that grants the capability. Both kinds are generic over a
//! single backend type, which must implement `AuthManagement` along with the listed traits.
use actix_web::{get, web, HttpResponse, Responder};
use backoffice_engine::{
    db_types::Capability,
    traits::{ApiKeyManagement, AuthManagement, ProductManagement, UserManagement},
    ApiKeyApi,
    AuthApi,
    ProductApi,
    UserApi,
};
use log::*;
use shopify_tools::StorefrontProducts;

use crate::{
    auth::{AuthenticatedUser, AuthorizedUser, TokenCodec},
    data_objects::{
        ApiKeyList,
        AllProducts,
        Bestsellers,
        ChangePasswordRequest,
        DeleteApiKeyRequest,
        DeleteApiKeyResponse,
        LoginRequest,
        LoginResponse,
        MyProducts,
        NewApiKeyRequest,
        NewApiKeyResponse,
        NewProductRequest,
        RegisterRequest,
        TokenResponse,
        UserList,
    },
    errors::ServerError,
    shopify_routes,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where authenticated) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ backoffice_engine::traits::AuthManagement + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AuthenticationMiddlewareFactory::<A>::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires $capability:expr)  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ backoffice_engine::traits::AuthManagement + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                // The last middleware added runs first, so authentication happens before the ACL check
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::<A>::new($capability))
                    .wrap($crate::middleware::AuthenticationMiddlewareFactory::<A>::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/register" impl AuthManagement);
pub async fn register<B: AuthManagement>(
    body: web::Json<RegisterRequest>,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST register");
    let user = api.register(&body.name, &body.email, &body.password).await?;
    Ok(HttpResponse::Created().json(user.summary()))
}

route!(login => Post "/login" impl AuthManagement);
pub async fn login<B: AuthManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<B>>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST login");
    let user = api.login(&body.email, &body.password).await?;
    let token = codec.issue_for_user(&user)?;
    Ok(HttpResponse::Ok().json(LoginResponse { token, expires_in: codec.expires_in(), user: user.summary() }))
}

route!(change_password => Patch "/change-password" impl AuthManagement where authenticated);
pub async fn change_password<A: AuthManagement>(
    user: AuthenticatedUser,
    body: web::Json<ChangePasswordRequest>,
    api: web::Data<AuthApi<A>>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ PATCH change-password for user #{}", user.0.user_id);
    let updated = api.change_password(user.0.user_id, &body.current_password, &body.new_password).await?;
    let token = codec.issue_for_user(&updated)?;
    Ok(HttpResponse::Ok().json(TokenResponse {
        message: "Password changed successfully".into(),
        token,
        expires_in: codec.expires_in(),
    }))
}

//----------------------------------------------   Users  ----------------------------------------------------
route!(users => Get "/users" impl UserManagement where requires Capability::GetUsers);
pub async fn users<A: UserManagement>(
    user: AuthorizedUser,
    api: web::Data<UserApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET users for user #{}", user.0.identity.user_id);
    let users = api.all_users().await?;
    Ok(HttpResponse::Ok().json(UserList::from(users)))
}

route!(my_user => Get "/my-user" impl UserManagement where requires Capability::GetMyUser);
pub async fn my_user<A: UserManagement>(
    user: AuthorizedUser,
    api: web::Data<UserApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my-user for user #{}", user.0.identity.user_id);
    let profile = api.profile(user.0.identity.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

//----------------------------------------------   API keys  ----------------------------------------------------
route!(api_keys => Get "/apikey" impl ApiKeyManagement where requires Capability::ManageApiKeys);
pub async fn api_keys<A: ApiKeyManagement>(
    user: AuthorizedUser,
    api: web::Data<ApiKeyApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET apikey for user #{}", user.0.identity.user_id);
    let keys: ApiKeyList = api.keys_for_user(user.0.identity.user_id).await?;
    Ok(HttpResponse::Ok().json(keys))
}

route!(create_api_key => Post "/apikey" impl ApiKeyManagement where requires Capability::ManageApiKeys);
pub async fn create_api_key<A: ApiKeyManagement>(
    user: AuthorizedUser,
    body: web::Json<NewApiKeyRequest>,
    api: web::Data<ApiKeyApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST apikey for user #{}", user.0.identity.user_id);
    let key = api.create_key(user.0.identity.user_id, &body.name).await?;
    Ok(HttpResponse::Ok().json(NewApiKeyResponse { id: key.id, name: key.name, key: key.key }))
}

route!(delete_api_key => Delete "/apikey" impl ApiKeyManagement where requires Capability::ManageApiKeys);
pub async fn delete_api_key<A: ApiKeyManagement>(
    user: AuthorizedUser,
    body: web::Json<DeleteApiKeyRequest>,
    api: web::Data<ApiKeyApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ DELETE apikey for user #{}", user.0.identity.user_id);
    let id = body.id.ok_or_else(|| ServerError::InvalidInput("API key id is required".into()))?;
    api.revoke_key(user.0.identity.user_id, id).await?;
    Ok(HttpResponse::Ok().json(DeleteApiKeyResponse { id, message: "API key deleted".into() }))
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(products => Get "/products" impl ProductManagement where authenticated);
pub async fn products<A: ProductManagement>(
    user: AuthenticatedUser,
    api: web::Data<ProductApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET products for user #{}", user.0.user_id);
    let products = api.all_products().await?;
    Ok(HttpResponse::Ok().json(AllProducts::from(products)))
}

route!(my_products => Get "/my-products" impl ProductManagement where authenticated);
pub async fn my_products<A: ProductManagement>(
    user: AuthenticatedUser,
    api: web::Data<ProductApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my-products for user #{}", user.0.user_id);
    let products = api.products_for_user(user.0.user_id).await?;
    Ok(HttpResponse::Ok().json(MyProducts::from(products)))
}

route!(my_bestsellers => Get "/my-bestsellers" impl ProductManagement where requires Capability::GetBestsellers);
pub async fn my_bestsellers<A: ProductManagement>(
    user: AuthorizedUser,
    api: web::Data<ProductApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my-bestsellers for user #{}", user.0.identity.user_id);
    let products = api.bestsellers_for_user(user.0.identity.user_id).await?;
    Ok(HttpResponse::Ok().json(Bestsellers::from(products)))
}

/// `POST /products`. Generic over the storefront as well as the backend, so it is registered by hand rather than
/// through [`route!`].
pub struct CreateProductRoute<A, S>(core::marker::PhantomData<fn() -> (A, S)>);

impl<A, S> CreateProductRoute<A, S> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(core::marker::PhantomData)
    }
}

impl<A, S> actix_web::dev::HttpServiceFactory for CreateProductRoute<A, S>
where
    A: ProductManagement + AuthManagement + 'static,
    S: StorefrontProducts + 'static,
{
    fn register(self, config: &mut actix_web::dev::AppService) {
        let res = actix_web::Resource::new("/products")
            .name("create_product")
            .guard(actix_web::guard::Post())
            .to(create_product::<A, S>)
            .wrap(crate::middleware::AclMiddlewareFactory::<A>::new(Capability::PostProducts))
            .wrap(crate::middleware::AuthenticationMiddlewareFactory::<A>::new());
        actix_web::dev::HttpServiceFactory::register(res, config);
    }
}

pub async fn create_product<A: ProductManagement, S: StorefrontProducts>(
    user: AuthorizedUser,
    body: web::Json<NewProductRequest>,
    api: web::Data<ProductApi<A>>,
    storefront: web::Data<S>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST products for user #{}", user.0.identity.user_id);
    let product =
        shopify_routes::publish_product(user.0.identity.user_id, body.into_inner(), api.get_ref(), storefront.get_ref())
            .await?;
    Ok(HttpResponse::Created().json(product))
}
