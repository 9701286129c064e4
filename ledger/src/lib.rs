pub mod games;

mod config;
mod error;
mod ledger;
mod state;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;


pub use config::Limits;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use state::{Adb, Memory, Overlay, State, Status};
