//! Billing error types.

use ams_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Billing rule violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingError {
    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// Payment larger than what is left on the bill.
    #[error("Payment amount cannot exceed the remaining balance of {remaining:.2}")]
    ExceedsRemaining {
        /// Bill total minus the payments already recorded.
        remaining: Decimal,
    },
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::NonPositiveAmount => Self::Validation(err.to_string()),
            BillingError::ExceedsRemaining { .. } => Self::BusinessRule(err.to_string()),
        }
    }
}
