// Application layer: the ledger service and its error taxonomy.

mod error;
mod service;

pub use error::*;
pub use service::*;
