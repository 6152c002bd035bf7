//! `defaultdesk-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers and the domain error taxonomy.

pub mod error;
pub mod id;

pub use error::{ConflictReason, DomainError, DomainResult, ErrorKind, Resource};
pub use id::{ApplicationId, CustomerId, UserId};
