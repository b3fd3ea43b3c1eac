//! GraphVFS Core - Domain types, ports and configuration
//!
//! This crate contains the hexagonal architecture core shared by every other
//! GraphVFS crate:
//! - **Domain types** - `DriveItem`, `ParentReference`, `VirtualPath`, `ChangeEvent`
//! - **Port definitions** - Traits for adapters: `ITokenSource`, `IDeltaSource`
//! - **Configuration** - YAML-backed `Config` with validation and a builder
//!
//! # Architecture
//!
//! The domain module has no I/O. Ports define the trait interfaces the delta
//! engine and the Graph client meet at; adapter crates implement them.

pub mod config;
pub mod domain;
pub mod ports;
