//! Core module - the ISTVON record and configuration

pub mod config;
pub mod record;

pub use config::Config;
pub use record::{IstvonRecord, Notification, Outcome, SourceDescriptor, ToolDescriptor, Variables};
