pub mod txn;
pub mod variance;
