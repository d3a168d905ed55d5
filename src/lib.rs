pub mod cli;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod roles;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use error::{CaseError, Result};
