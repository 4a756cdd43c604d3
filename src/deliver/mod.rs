//! The deploy approval wizard.
//!
//! A slash command opens the wizard; each click advances it by one step. The
//! accumulated selections travel inside the rendered buttons (see [`codec`]),
//! so the process holds no per-run state and can restart at any time.

pub mod action;
pub mod blocks;
pub mod codec;
pub mod engine;
pub mod models;
pub mod planner;
pub mod ports;
pub mod registry;

pub use engine::{Awaiting, Outcome, WizardEngine, WizardError, WizardEvent, WizardSettings};
pub use models::{BuildParameters, CurrentVersion, Deployment};
pub use ports::{ChatGateway, Destination, SourceControl};
pub use registry::WizardRegistry;
