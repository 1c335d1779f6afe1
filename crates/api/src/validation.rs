//! Custom field validators shared by request DTOs.

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

/// Money is stored with two decimal places.
pub const MONEY_SCALE: u32 = 2;

/// Rejects strings that are empty once surrounding whitespace is removed.
///
/// # Errors
///
/// Returns a `blank` validation error.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("This field cannot be blank")));
    }
    Ok(())
}

/// Rejects amounts with fractions of a cent, so what is stored is what was split.
///
/// Trailing zeros are ignored: `12.500` is accepted.
///
/// # Errors
///
/// Returns a `money_scale` validation error.
pub fn cents(value: &Decimal) -> Result<(), ValidationError> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::new("money_scale")
            .with_message(Cow::Borrowed("Amount cannot have more than 2 decimal places")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("Lift", true)]
    #[case("  Lift  ", true)]
    #[case("", false)]
    #[case("   ", false)]
    #[case("\t\n", false)]
    fn test_not_blank(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(not_blank(value).is_ok(), ok);
    }

    #[rstest]
    #[case("100", true)]
    #[case("100.5", true)]
    #[case("100.05", true)]
    #[case("100.050", true)]
    #[case("100.005", false)]
    #[case("0.001", false)]
    fn test_cents(#[case] value: &str, #[case] ok: bool) {
        let amount = Decimal::from_str(value).unwrap();
        assert_eq!(cents(&amount).is_ok(), ok);
    }
}
