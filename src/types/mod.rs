//! Shared primitive types.
mod balance;
pub use balance::*;

mod operation;
pub use operation::*;

mod session;
pub use session::*;

mod transaction;
pub use transaction::*;
