//! # Printer Module
//!
//! Talking to network label printers.
//!
//! ## Modules
//!
//! - [`config`]: printer addresses and label stock presets
//! - [`link`]: one TCP connection and the raster/text send sequences
//! - [`manager`]: per-endpoint connection cache

pub mod config;
pub mod link;
pub mod manager;

pub use config::{DEFAULT_PORT, Endpoint, LabelStock, PrinterEndpoint};
pub use link::{LinkOptions, LinkState, PrinterLink};
pub use manager::PrinterManager;
