#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod hydration;
pub mod remote;
pub mod sheet_service;

pub use config::SheetConfig;
pub use error::{ConfigError, RemoteError, SheetServiceError};
pub use hydration::{HydrationOutcome, HydrationService};
pub use remote::{SheetApi, TopicRemote};
pub use sheet_service::{RemoteFailure, RemoteOp, SheetService};
