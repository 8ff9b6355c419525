//! HTTP adapter for the Kong admin API.
//!
//! This crate provides the shared client used by every `kongctl` resource
//! command:
//!
//! - **Configuration**: admin URL parsing and standing authorization headers
//! - **Request execution**: pooled transport, bounded deadlines, header
//!   injection
//! - **Response classification**: typed errors for non-success statuses
//!
//! # Example
//!
//! ```no_run
//! use kongctl_client::{basic_auth_header, Gateway};
//!
//! # async fn example() -> kongctl_client::Result<()> {
//! let gateway = Gateway::new("http://127.0.0.1:8001", basic_auth_header("token")?)?;
//! let response = gateway.get("services", &[]).await?;
//! let body = response.bytes().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;

pub use client::{Gateway, ServerResponse, REQUEST_TIMEOUT};
pub use config::{basic_auth_header, AdminUrl};
pub use error::{Error, Result};
