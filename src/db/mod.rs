//! Persistence layer: the record store, its text codec and file locations.

pub mod codec;
mod error;
pub mod location;
mod store;

pub use codec::{decode, encode, Document};
pub use error::{Result, StoreError};
pub use store::{Store, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
