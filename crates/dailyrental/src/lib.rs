pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod storage;

pub use config::DailyRentalConfig;
pub use error::{RentalError, Result};
