use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};

use crate::validator::TokenValidator;

/// Extractor for `Authorization: Bearer <token>`, delegating the actual
/// check to an injected [`TokenValidator`] (spec.md §6: "bearer-token auth
/// via `Authorization: Bearer <token>` header").
pub struct BearerAuth;

impl FromRequest for BearerAuth {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let validator = req.app_data::<web::Data<Arc<dyn TokenValidator>>>().cloned();

        let result = (|| {
            let header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| actix_web::error::ErrorForbidden("missing authorization header"))?;
            let token = header
                .strip_prefix("Bearer ")
                .ok_or_else(|| actix_web::error::ErrorForbidden("invalid authorization format"))?;
            let validator = validator.ok_or_else(|| actix_web::error::ErrorInternalServerError("token validator not configured"))?;
            validator
                .validate(token)
                .map_err(|_| actix_web::error::ErrorForbidden("bad token"))?;
            Ok(BearerAuth)
        })();

        ready(result)
    }
}
