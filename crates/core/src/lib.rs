#![forbid(unsafe_code)]

pub mod import;
pub mod model;
pub mod progress;
pub mod reorder;
pub mod search;

pub use progress::{NextQuestion, Progress, Scope};
