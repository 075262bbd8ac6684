//! Synchronous client and resource adapters for the Beanstalk API.
//!
//! # Overview
//! Manages Beanstalk repositories, code-review settings, teams, users and
//! repository integrations as declared resources. Each resource type has an
//! adapter implementing [`Resource`]: create, read, update and delete against
//! the account's REST API, translating between declared attributes and the
//! JSON payloads the service speaks.
//!
//! # Design
//! - Requests are plain data. [`BeanstalkClient::build_request`] produces an
//!   `HttpRequest` and [`client::classify`] interprets an `HttpResponse`; the
//!   round-trip in between goes through a [`Transport`], so everything above
//!   the transport is testable without a network.
//! - 404 is always [`ApiError::NotFound`]. Adapters turn it into "gone" on
//!   read so the host can drop the resource from its records.
//! - Integration types are described by static [`schema::Field`] slices; one
//!   generic adapter serves all of them.
//! - Write-only attributes are recorded as SHA-256 hashes, never in clear.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod request;
pub mod resources;
pub mod schema;
pub mod state;
pub mod transport;
pub mod types;

pub use client::BeanstalkClient;
pub use config::{ClientConfig, ProviderConfig};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::Request;
pub use resources::Resource;
pub use transport::{Transport, UreqTransport};
