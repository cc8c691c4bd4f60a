//! cosmic-client: HTTP client library for the stack state service
//!
//! Implements the inventory collaborator traits on top of `reqwest`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cosmic_client::HttpClient;
//! use cosmic_inventory::{Collector, parse_args};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("https://api.pulumi.com")?
//!     .with_access_token(std::env::var("PULUMI_ACCESS_TOKEN").ok());
//!
//! let (query, props) = parse_args(&["acme/", "aws:s3/"])?;
//! let rows = Collector::new(Arc::new(client))
//!     .collect_rows(&query, &props)
//!     .await?;
//! println!("{} resources", rows.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;
pub mod inventory;
pub mod schema;

pub use error::{ClientError, Result};
pub use http::{DEFAULT_BACKEND_URL, HttpClient};
pub use inventory::ServiceStack;
pub use schema::{DEFAULT_SCHEMA_URL, SchemaClient};
