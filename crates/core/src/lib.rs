//! Contact Desk Core - Shared types library.
//!
//! This crate provides the types and rules shared by all Contact Desk components:
//! - `server` - Public contact API, image analysis and the admin panel
//! - `cli` - Command-line tools for migrations and admin provisioning
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The validation engine lives here so that every
//! layer applies exactly the same rules.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails
//! - [`validation`] - Contact submission validation
//! - [`contact`] - The persisted contact record

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod contact;
pub mod types;
pub mod validation;

pub use contact::Contact;
pub use types::*;
pub use validation::{ContactDraft, ContactSubmission, Field, ValidationErrors, validate};
