//! Read-only checks performed before a value-moving transaction is attempted.

mod allowance;
pub use allowance::{AllowanceChecker, ApprovalCheck, ApprovalRequest};

mod balance;
pub use balance::{ChainBalanceReader, select_balances};
