//! Core types and parsing pipeline for ocal.
//!
//! This crate holds everything with real logic in it and nothing that does
//! I/O against the calendar service:
//! - `event`: the canonical `Event` model
//! - `temporal`: relative-date and clock-time token resolution
//! - `tz`: timezone precedence, localization, all-day boundaries
//! - `quickadd`: natural-language event compilation
//! - `recurrence`: the restricted recurrence model and its two encodings
//! - `wire`: bidirectional mapping to the service's event payload
//! - `ics`: ICS import parsing
//!
//! Everything is pure and synchronous; "now" and the timezone context are
//! always explicit parameters.

pub mod config;
pub mod error;
pub mod event;
pub mod ics;
pub mod quickadd;
pub mod recurrence;
pub mod temporal;
pub mod tz;
pub mod wire;

pub use error::{OcalError, OcalResult};
pub use event::{Event, EventTime};
pub use recurrence::{ByDay, Frequency, Recurrence};
