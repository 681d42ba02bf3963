//! # kakao-local-mcp
//!
//! South Korea location search from the Kakao Local API, exposed as MCP tools.
//!
//! ## Architecture
//!
//! 1. **`LocalClient`** builds requests for the four upstream operations, sends
//!    them through a [`Transport`](http::Transport) and turns non-200 statuses
//!    into typed [`ClientError`]s.
//! 2. **`LocationTools`** validates tool arguments, calls the client and
//!    folds every failure into a [`ToolOutcome`].
//! 3. **`KakaoLocalServer`** registers the tools and the
//!    `resource://category_group_code` resource with an rmcp server.
//!
//! ## Example
//! ```no_run
//! use kakao_local_mcp::config::Config;
//! use kakao_local_mcp::model::KeywordSearch;
//! use kakao_local_mcp::LocalClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LocalClient::new(&Config::new("your-rest-api-key"))?;
//!
//!     let response = client
//!         .search_by_keyword(&KeywordSearch::new("카카오프렌즈"))
//!         .await?;
//!     for place in response.documents {
//!         println!("{} ({}, {})", place.place_name, place.x, place.y);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod http;
pub mod model;
pub mod server;
pub mod tools;

pub use client::{ClientError, LocalClient};
pub use config::{Config, TransportOptions};
pub use server::KakaoLocalServer;
pub use tools::{LocationTools, ToolError, ToolOutcome};

// Re-export rmcp for convenience
pub use rmcp;
