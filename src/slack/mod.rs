//! Slack wire types and response delivery

pub mod gateway;
pub mod message;
pub mod payload;

pub use gateway::ResponseUrlGateway;
pub use message::SlackMessage;
