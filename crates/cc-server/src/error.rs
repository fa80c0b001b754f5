use actix_web::{HttpResponse, ResponseError};
use cc_dto::{ApiError, CodedError};

/// Local wrapper around [`ApiError`] so it can implement
/// [`ResponseError`]; neither type is local to this crate on its own
/// (spec.md §6: coded errors map onto conventional HTTP statuses).
#[derive(Debug, Clone, Copy)]
pub struct ApiFailure(pub ApiError);

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl From<ApiError> for ApiFailure {
    fn from(err: ApiError) -> Self {
        ApiFailure(err)
    }
}

impl ResponseError for ApiFailure {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(self.0.http_status())
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(CodedError::from(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_follows_the_wrapped_error() {
        let failure = ApiFailure(ApiError::NoSuchRoom);
        assert_eq!(failure.status_code().as_u16(), 410);
    }
}
