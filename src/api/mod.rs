//! REST clients for the services the wizard talks to
//!
//! - GitHub: branch listing and the version file
//! - Bitrise: build triggers

pub mod bitrise;
pub mod error;
pub mod github;

pub use bitrise::{BitriseClient, BitriseDestination};
pub use error::ApiError;
pub use github::GitHubSource;
