//! Expense payments recorded against a bill.

use rust_decimal::Decimal;

use super::BillingError;

/// Bill total minus payments already recorded.
#[must_use]
pub fn remaining_balance(total: Decimal, paid_so_far: Decimal) -> Decimal {
    total - paid_so_far
}

/// Validates a new payment of `amount` against a bill.
///
/// Returns the balance left after the payment.
///
/// # Errors
///
/// - `NonPositiveAmount` if `amount <= 0`
/// - `ExceedsRemaining` if `amount` is more than what is left on the bill
pub fn check_payment(
    total: Decimal,
    paid_so_far: Decimal,
    amount: Decimal,
) -> Result<Decimal, BillingError> {
    if amount <= Decimal::ZERO {
        return Err(BillingError::NonPositiveAmount);
    }
    let remaining = remaining_balance(total, paid_so_far);
    if amount > remaining {
        return Err(BillingError::ExceedsRemaining { remaining });
    }
    Ok(remaining - amount)
}

/// Dropdown label for a bill with money still owed on it.
#[must_use]
pub fn outstanding_label(name: &str, outstanding: Decimal) -> String {
    format!("{name} (Outstanding: {outstanding:.2})")
}
