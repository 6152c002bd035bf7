//! Customers domain module.
//!
//! This crate contains the customer record and its default flag, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod customer;

pub use customer::{Customer, CustomerField, RegisterCustomer};
