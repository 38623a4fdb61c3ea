//! `fleetbooks-numbering` — human-readable document numbers.
//!
//! Invoice and repair documents carry numbers like `INV250823001`: a kind
//! prefix, the issue date, and a per-day sequence. This crate owns the number
//! format and the generator that keeps sequences unique per scope.

pub mod document;
pub mod generator;

pub use document::{DocumentKind, DocumentNumber};
pub use generator::SequenceNumberGenerator;
