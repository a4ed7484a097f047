use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderMap},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthUser;
use crate::auth::token::TokenService;
use crate::error::AppError;

/// Returns the credential from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. A missing header, another
/// scheme, or an empty credential all yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The authentication stage: resolves request headers to an identity or an
/// error ready to be rendered as 401.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthUser, AppError> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Access token required".into()))?;

    tokens.verify(token).map(AuthUser::from).map_err(|e| {
        log::debug!("Rejected bearer token: {}", e);
        AppError::from(e)
    })
}

/// Guards a scope or resource with bearer-token authentication.
///
/// On success the resolved [`AuthUser`] is stored in the request extensions
/// and the wrapped service runs. On failure the request is answered with a
/// 401 envelope and the wrapped service never runs.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = match req.app_data::<web::Data<TokenService>>() {
            Some(tokens) => authenticate(req.headers(), tokens),
            None => Err(AppError::InternalError(
                "TokenService is not registered as app data".into(),
            )),
        };

        match outcome {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                let res = req.error_response(err).map_into_right_body();
                Box::pin(ready(Ok(res)))
            }
        }
    }
}
