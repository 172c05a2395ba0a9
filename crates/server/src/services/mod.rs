//! Business logic services.
//!
//! # Services
//!
//! - `contacts` - Contact validation and persistence orchestration
//! - `use_cases` - One entry point per client intent, used by route handlers
//! - `auth` - Admin password verification and provisioning (Argon2id)
//! - `classifier` - Image classification adapter and image ingestion

pub mod auth;
pub mod classifier;
pub mod contacts;
pub mod use_cases;

pub use auth::{AuthError, AuthService};
pub use classifier::{
    ClassifierError, HttpClassifier, ImageClassifier, ImageInput, Prediction, fetch_image,
};
pub use contacts::{ContactError, ContactService};
pub use use_cases::{CreateContact, DeleteContact, ListContacts, UpdateContact};
