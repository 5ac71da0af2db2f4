//! kakei-store: file-backed persistence for forecast inputs.

pub mod error;
pub mod record;
pub mod state;
pub mod store;

pub use error::{Result, StoreError};
pub use record::{AccountRecord, UserRecord};
pub use state::ForecastState;
pub use store::{ForecastStore, JsonStore};
