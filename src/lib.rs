pub mod boundary;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod process;
pub mod publish;
pub mod store;
pub mod ui;
pub mod version;

pub use cli::orchestration::{ReleaseOrchestrator, ReleaseOutcome, ReleaseSettings, ReleaseState};
pub use error::{ReleaseError, Result};
