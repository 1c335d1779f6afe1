//! Splitting a bill across flat owners.
//!
//! Each owner pays `total / owned_flats * their_flat_count`. Shares are
//! computed at cent precision with the largest remainder method:
//! 1. Compute each exact share
//! 2. Truncate to cents
//! 3. Hand the leftover cents, one each, to the largest truncated fractions
//!
//! so the shares always add up to the bill total.

use rust_decimal::prelude::*;
use uuid::Uuid;

use super::BillingError;

/// Monetary precision of allocations.
pub const CENT_PLACES: u32 = 2;

/// An owner and how many flats they own in the billed building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerShare {
    /// Owner user ID.
    pub owner_id: Uuid,
    /// Flats owned in the building.
    pub flat_count: u32,
}

/// Amount due from one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareAllocation {
    /// Owner user ID.
    pub owner_id: Uuid,
    /// Flats owned in the building.
    pub flat_count: u32,
    /// Owner's share of the bill.
    pub amount_due: Decimal,
}

/// Splits `total` across `owners` in proportion to their flat counts.
///
/// Owners with zero flats are skipped. With no owned flats at all the bill
/// gets no allocations and an empty vector is returned.
///
/// # Errors
///
/// Returns `BillingError::NonPositiveAmount` if `total <= 0`.
///
/// # Example
///
/// ```
/// use ams_core::billing::{OwnerShare, split_by_flat_count};
/// use rust_decimal_macros::dec;
/// use uuid::Uuid;
///
/// let owners = [
///     OwnerShare { owner_id: Uuid::new_v4(), flat_count: 2 },
///     OwnerShare { owner_id: Uuid::new_v4(), flat_count: 1 },
/// ];
/// let shares = split_by_flat_count(dec!(100), &owners).unwrap();
/// assert_eq!(shares[0].amount_due, dec!(66.67));
/// assert_eq!(shares[1].amount_due, dec!(33.33));
/// ```
pub fn split_by_flat_count(
    total: Decimal,
    owners: &[OwnerShare],
) -> Result<Vec<ShareAllocation>, BillingError> {
    if total <= Decimal::ZERO {
        return Err(BillingError::NonPositiveAmount);
    }

    let owners: Vec<OwnerShare> = owners.iter().copied().filter(|o| o.flat_count > 0).collect();
    let total_flats: u64 = owners.iter().map(|o| u64::from(o.flat_count)).sum();
    if total_flats == 0 {
        return Ok(Vec::new());
    }

    let unit = Decimal::new(1, CENT_PLACES);
    let total = total.round_dp_with_strategy(CENT_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let total_flats = Decimal::from(total_flats);

    let exact: Vec<Decimal> = owners
        .iter()
        .map(|o| total * Decimal::from(o.flat_count) / total_flats)
        .collect();
    let mut shares: Vec<Decimal> = exact
        .iter()
        .map(|a| a.round_dp_with_strategy(CENT_PLACES, RoundingStrategy::ToZero))
        .collect();

    let leftover = total - shares.iter().copied().sum::<Decimal>();
    let leftover_units = (leftover / unit).trunc().to_usize().unwrap_or(0);

    // Largest truncated fraction first; ties go to the earlier owner.
    let mut order: Vec<usize> = (0..owners.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - shares[a];
        let rb = exact[b] - shares[b];
        rb.cmp(&ra).then(a.cmp(&b))
    });
    for &idx in order.iter().take(leftover_units) {
        shares[idx] += unit;
    }

    Ok(owners
        .iter()
        .zip(shares)
        .map(|(o, amount_due)| ShareAllocation {
            owner_id: o.owner_id,
            flat_count: o.flat_count,
            amount_due,
        })
        .collect())
}
