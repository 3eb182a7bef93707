//! Record storage.

mod config;
mod store;
mod transaction;

pub use config::StoreConfig;
pub use store::{RecordStore, Scan};
pub use transaction::Transaction;
