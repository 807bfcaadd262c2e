//! Pawprint Core - Shared types library.
//!
//! This crate provides common types used across all Pawprint components:
//! - `storefront` - Public-facing pet-shop storefront
//! - `integration-tests` - Cross-crate test harness
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! storage access. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Credentials, user profiles, and the unauthorized wire
//!   contract shared by the session subsystem

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
