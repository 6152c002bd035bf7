//! Infrastructure layer: stores, transactional services, configuration.

pub mod config;
pub mod customers;
pub mod db;
pub mod identity;
pub mod lifecycle;
pub mod repository;
pub mod service;
pub mod statistics;

pub use service::{ServiceError, ServiceResult};


#[cfg(test)]
mod postgres_tests;
