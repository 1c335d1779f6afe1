//! HTTP error responses.
//!
//! Every handler returns `Result<_, ApiError>`. The body is always
//! `{"error": "<CODE>", "message": "...", "fields": {...}}`, with `fields`
//! present only for request validation failures.

use std::collections::BTreeMap;

use ams_core::AccessError;
use ams_core::auth::PasswordError;
use ams_core::billing::BillingError as BillingRule;
use ams_core::entry_log::EntryLogError as EntryRule;
use ams_db::repositories::{
    BillingError, BuildingError, EntryLogError, ExpenseError, FlatError, RentError, ReportError,
    TenantError, UserError,
};
use ams_shared::{AppError, JwtError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use validator::ValidationErrors;

/// Error returned by API handlers.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    fields: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    /// Request body failed field validation.
    #[must_use]
    pub fn invalid(errors: &ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| format!("{field} is invalid"), ToString::to_string)
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        Self {
            error: AppError::Validation("Request validation failed".to_string()),
            fields: Some(fields),
        }
    }

    /// The wrapped application error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            fields: None,
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        AppError::Database(err.to_string()).into()
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Policy => AppError::Validation(err.to_string()).into(),
            other => AppError::Internal(other.to_string()).into(),
        }
    }
}

macro_rules! via_app_error {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for ApiError {
                fn from(err: $ty) -> Self {
                    AppError::from(err).into()
                }
            }
        )+
    };
}

via_app_error!(
    AccessError,
    BillingError,
    BillingRule,
    BuildingError,
    EntryLogError,
    EntryRule,
    ExpenseError,
    FlatError,
    JwtError,
    RentError,
    ReportError,
    TenantError,
    UserError,
);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.error, "Request failed");
        }

        let body = ErrorBody {
            error: self.error.error_code(),
            message: self.error.public_message(),
            fields: self.fields,
        };
        (status, Json(body)).into_response()
    }
}

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use validator::Validate;

    #[derive(Validate)]
    struct NameForm {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
    }

    #[rstest]
    #[case(AppError::NotFound("Flat not found".into()), StatusCode::NOT_FOUND)]
    #[case(AppError::Forbidden("no".into()), StatusCode::FORBIDDEN)]
    #[case(AppError::BusinessRule("over".into()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(AppError::Database("boom".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_mapping(#[case] error: AppError, #[case] expected: StatusCode) {
        let response = ApiError::from(error).into_response();
        assert_eq!(response.status(), expected);
    }

    #[test]
    fn test_validation_collects_field_messages() {
        let errors = NameForm {
            name: String::new(),
        }
        .validate()
        .unwrap_err();
        let err = ApiError::invalid(&errors);

        assert_eq!(err.inner().status_code(), 400);
        let fields = err.fields.as_ref().unwrap();
        assert_eq!(fields["name"], vec!["name is required".to_string()]);
    }

    #[test]
    fn test_password_policy_is_client_error() {
        let err = ApiError::from(PasswordError::Policy);
        assert_eq!(err.inner().status_code(), 400);
    }
}
