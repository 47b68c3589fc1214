use std::{future::Future, pin::Pin, rc::Rc, sync::Arc};

use actix_web::{
    Error, HttpMessage, HttpResponse,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use common::jwt;
use futures::future::{Ready, ok};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// 401 without a valid token.
    Required,
    /// Anonymous requests pass, a bad token is still rejected.
    Optional,
}

/// Validates `Authorization: Bearer <jwt>` locally and inserts the
/// `JwtClaims` into request extensions for `web::ReqData<JwtClaims>`.
pub struct AuthMiddleware {
    secret: Rc<String>,
    mode: AuthMode,
}

impl AuthMiddleware {
    pub fn new(secret: String, mode: AuthMode) -> Self {
        AuthMiddleware {
            secret: Rc::new(secret),
            mode,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Arc::new(service),
            secret: self.secret.clone(),
            mode: self.mode,
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Arc<S>,
    secret: Rc<String>,
    mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = bearer_token(&req);
        let srv = Arc::clone(&self.service);

        let Some(token) = token else {
            if self.mode == AuthMode::Optional {
                return Box::pin(async move { srv.call(req).await.map(|res| res.map_into_boxed_body()) });
            }
            return Box::pin(async move { Ok(unauthorized(req, "No authorization token provided")) });
        };

        match jwt::validate_jwt(&token, &self.secret) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(async move { srv.call(req).await.map(|res| res.map_into_boxed_body()) })
            }
            Err(e) => {
                log::debug!("Rejected bearer token on {}: {}", req.path(), e);
                Box::pin(async move { Ok(unauthorized(req, "Invalid token")) })
            }
        }
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<actix_web::body::BoxBody> {
    let response = HttpResponse::Unauthorized()
        .json(serde_json::json!({ "error": message }))
        .map_into_boxed_body();
    req.into_response(response)
}
