//! imgbatch Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities for the imgbatch workspace.
//!
//! # Overview
//!
//! - **Logging**: tracing subscriber setup driven by environment variables
//! - **URL lists**: the delimited text encoding used to persist ordered
//!   image references, and file name derivation from image URLs
//! - **Error Handling**: error type for the helpers above
//!
//! # Example
//!
//! ```no_run
//! use imgbatch_common::logging::{init_logging, LogConfig};
//! use imgbatch_common::url_list::join_urls;
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     let joined = join_urls(&["http://x/a.png".to_string()]);
//!     tracing::info!(%joined, "joined");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod url_list;

// Re-export commonly used types
pub use error::{CommonError, Result};
