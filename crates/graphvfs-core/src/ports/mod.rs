//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the interfaces the delta engine and the Graph client meet at.
//! Implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ITokenSource`] - Supplies bearer credentials for remote calls
//! - [`IDeltaSource`] - Fetches fully materialized delta page sequences

pub mod delta_source;
pub mod token_source;

pub use delta_source::{DeltaCursorExpired, DeltaPage, IDeltaSource};
pub use token_source::ITokenSource;
