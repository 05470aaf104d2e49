//! Headless testing helpers.
//!
//! Use the [`Pilot`] to drive a [`Runtime`](crate::runtime::Runtime) by
//! element id and read back the projected attributes.

pub mod pilot;

pub use pilot::Pilot;
