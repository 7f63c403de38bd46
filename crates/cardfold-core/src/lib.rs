//! Core domain types and configuration for cardfold.

pub mod config;
pub mod error;
pub mod record;

pub use error::{CoreError, CoreResult};
pub use record::{
    ContactRecord, Destination, ExtensionProperty, NameParts, PostalAddress, Source,
};
