//! Deliver - a Slack deploy approval wizard
//!
//! A slash command walks the user through destination, branch, version and
//! build number, then triggers a Bitrise build after confirmation.

pub mod api;
pub mod config;
pub mod deliver;
pub mod logging;
pub mod rest;
pub mod slack;
