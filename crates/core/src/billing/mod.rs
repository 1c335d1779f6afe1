//! Common bill splitting and expense payment rules.

pub mod allocation;
pub mod error;
pub mod payment;


pub use allocation::{OwnerShare, ShareAllocation, split_by_flat_count};
pub use error::BillingError;
pub use payment::{check_payment, outstanding_label, remaining_balance};
