//! Default-determination applications domain module.
//!
//! This crate contains the application record and its status lifecycle,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).
//!
//! ```text
//! Pending ──approve──▶ Approved ──apply rebirth──▶ RebirthPending ──approve rebirth──▶ Reborn
//!    │
//!    └────reject────▶ Rejected
//! ```

pub mod application;

pub use application::{
    ApplicationField, ApplicationStatus, DefaultApplication, Severity, SubmitApplication,
};
