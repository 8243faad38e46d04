pub mod boundary;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod domain;
pub mod error;
pub mod files;
pub mod rewriter;
pub mod ui;

pub use error::{ReleaseError, Result};
