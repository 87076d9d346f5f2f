pub mod transaction;

pub use transaction::{Address, Transaction};
