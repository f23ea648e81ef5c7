//! Wire types for the warehouse portal API.
//!
//! This crate contains the serde-serializable types exchanged with the portal
//! and with the captcha recognition service. These types represent the
//! "protocol layer" - the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization and query encoding
//! * 1:1 with the portal: Field names match the portal's JSON and query keys
//! * Stable: Changes only when the portal contract changes
//!
//! Session handling, retries and workflow logic live in `wms-rs`.

pub mod auth;
pub mod envelope;
pub mod ocr;
pub mod outbound;

pub use auth::*;
pub use envelope::*;
pub use ocr::*;
pub use outbound::*;
