//! # webapp-template-api
//!
//! Shared API types for the webapp-template service.
//! This crate only depends on serde so it can be reused by clients,
//! including WASM frontends.
//!
//! ## Features
//!
//! - Request DTOs (`LoginForm`, `SignupForm`)
//! - Response DTOs (`ExampleResponse`, `ProtectedUserResponse`, etc.)
//! - Error response format (`ErrorResponse`)
//! - The `status` discriminator shared by every JSON body (`ApiStatus`)
//!
//! ## Example
//!
//! ```rust
//! use webapp_template_api::{ApiStatus, ExampleResponse};
//!
//! let body = ExampleResponse::sample();
//! assert_eq!(body.status, ApiStatus::Success);
//! assert_eq!(body.data.count, 3);
//! ```

pub mod error;
pub mod requests;
pub mod responses;
pub mod result;

// Re-exports for convenient access
pub use error::ErrorResponse;
pub use requests::*;
pub use responses::*;
pub use result::ApiStatus;
