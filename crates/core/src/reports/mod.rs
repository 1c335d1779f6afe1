//! Report and dashboard figures.
//!
//! Repositories gather raw sums; the arithmetic that turns them into
//! balances lives here so that every screen computes them the same way.

use rust_decimal::Decimal;
use serde::Serialize;

/// Money in and out of a building, as seen by its president.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildingTotals {
    /// Sum of all bill totals.
    pub total_bills: Decimal,
    /// Sum of allocations owners have paid.
    pub total_collected: Decimal,
    /// Sum of expense payments made against bills.
    pub total_payments: Decimal,
}

impl BuildingTotals {
    /// Cash on hand: collected from owners minus paid out.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.total_collected - self.total_payments
    }

    /// Amount billed that has not been paid out yet.
    #[must_use]
    pub fn unspent_bills(&self) -> Decimal {
        self.total_bills - self.total_payments
    }
}

/// Occupancy counts for a set of flats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    /// All flats.
    pub total: u64,
    /// Flats marked occupied.
    pub occupied: u64,
}

impl Occupancy {
    /// Flats not marked occupied.
    #[must_use]
    pub const fn vacant(&self) -> u64 {
        self.total.saturating_sub(self.occupied)
    }
}

/// An owner's money position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OwnerFinancials {
    /// Unpaid allocations.
    pub bills_due: Decimal,
    /// Paid allocations.
    pub bills_paid: Decimal,
    /// Rent received from tenants.
    pub rent_collected: Decimal,
}

impl OwnerFinancials {
    /// Rent received minus bills paid.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.rent_collected - self.bills_paid
    }
}

/// System-wide allocation totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SystemFinancials {
    /// Sum of all bill totals.
    pub total_bills_generated: Decimal,
    /// Sum of all expense payments.
    pub total_payments_made: Decimal,
    /// Paid allocations.
    pub total_collected: Decimal,
    /// Unpaid allocations.
    pub total_pending: Decimal,
}

impl SystemFinancials {
    /// Collected minus paid out, over every building.
    #[must_use]
    pub fn overall_balance(&self) -> Decimal {
        self.total_collected - self.total_payments_made
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_building_balance() {
        let totals = BuildingTotals {
            total_bills: dec!(5000),
            total_collected: dec!(3200.50),
            total_payments: dec!(1200),
        };
        assert_eq!(totals.balance(), dec!(2000.50));
        assert_eq!(totals.unspent_bills(), dec!(3800));
    }

    #[test]
    fn test_balance_can_go_negative() {
        let totals = BuildingTotals {
            total_bills: dec!(100),
            total_collected: dec!(0),
            total_payments: dec!(100),
        };
        assert_eq!(totals.balance(), dec!(-100));
    }

    #[test]
    fn test_occupancy() {
        let occ = Occupancy {
            total: 12,
            occupied: 9,
        };
        assert_eq!(occ.vacant(), 3);
        assert_eq!(Occupancy::default().vacant(), 0);
    }

    #[test]
    fn test_owner_balance() {
        let fin = OwnerFinancials {
            bills_due: dec!(150),
            bills_paid: dec!(350),
            rent_collected: dec!(1200),
        };
        assert_eq!(fin.balance(), dec!(850));
    }

    #[test]
    fn test_overall_balance() {
        let fin = SystemFinancials {
            total_bills_generated: dec!(10000),
            total_payments_made: dec!(4000),
            total_collected: dec!(6500),
            total_pending: dec!(3500),
        };
        assert_eq!(fin.overall_balance(), dec!(2500));
    }
}
