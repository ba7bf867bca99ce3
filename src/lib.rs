//! Paybridge - Provider-agnostic payment orchestration.
//!
//! This crate fronts multiple payment providers behind one uniform
//! contract: create payments through a single request shape, track their
//! lifecycle through a canonical status machine, and process provider
//! webhooks under a verify-before-trust rule.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
