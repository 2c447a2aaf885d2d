//! # Terradep State
//!
//! Identity resolution for Terraform deployments.
//!
//! Every deployment persists its state somewhere (an S3 object, a blob, a local file).
//! This crate turns the raw backend configuration found in a deployment, or in a
//! `terraform_remote_state` data source pointing at it, into a comparable [`State`].
//!
//! ## Architecture
//!
//! ```text
//! (backend type, Attributes)
//!     │
//!     └──> ResolverRegistry
//!            ├─ "s3"  -> S3Resolver   (bucket + key [+ region] [+ encrypt])
//!            └─ ...   -> any registered StateResolver
//!                   │
//!                   └─> State ("s3://bucket/key")
//! ```
//!
//! ## Example
//!
//! ```
//! use terradep_state::{AttrValue, Attributes, ResolverRegistry};
//!
//! let registry = ResolverRegistry::default();
//! let mut config = Attributes::new();
//! config.insert("bucket".into(), AttrValue::from("infra"));
//! config.insert("key".into(), AttrValue::from("net/state"));
//!
//! let state = registry.resolve_dependency_state("s3", &config).unwrap();
//! assert_eq!(state.to_string(), "s3://infra/net/state");
//! ```

mod error;
mod registry;
mod s3;
mod state;
mod value;

pub use error::{ResolveError, Result};
pub use registry::{ResolverRegistry, StateResolver};
pub use s3::{S3Resolver, S3ResolverConfig, S3_BACKEND};
pub use state::State;
pub use value::{AttrValue, Attributes};
