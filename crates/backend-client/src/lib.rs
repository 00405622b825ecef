//! Backend client for the voice agent.
//!
//! This crate talks to the backend service that owns agent configuration,
//! tool-set configuration and call history. It supports:
//!
//! - Fetching an [`Agent`] by id
//! - Fetching a [`ToolDescriptor`] by id
//! - Asking whether an organization is open at a given time
//! - Persisting a [`HistoryRecord`] once a call has ended
//!
//! Every request carries `Authorization: Bearer <secret>`. When no secret is
//! configured, fetches fail with [`BackendError::Configuration`] before any
//! network traffic, and history persistence is skipped with a warning.
//!
//! # Example
//!
//! ```no_run
//! use backend_client::{BackendApi, BackendClient, BackendConfig};
//!
//! # async fn example() -> Result<(), backend_client::BackendError> {
//! let config = BackendConfig::new("http://127.0.0.1:8000").with_secret("s3cret");
//! let client = BackendClient::new(config)?;
//!
//! let agent = client.fetch_agent("agent-42").await?;
//! println!("{} uses voice {}", agent.name, agent.voice);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
mod de;
pub mod error;
pub mod types;

pub use client::{BackendApi, BackendClient};
pub use config::BackendConfig;
pub use error::BackendError;
pub use types::*;

// Re-export async_trait for implementors of BackendApi
pub use async_trait::async_trait;
