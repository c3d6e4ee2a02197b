//! AWS SigV4 signing for awssign.
//!
//! This crate computes the `Authorization` header (and its companions) that proves
//! possession of an AWS secret key without sending it.
//!
//! ## Overview
//!
//! - [`ServiceIdentity`] describes the target service: host, service, region and the
//!   headers every request must sign. [`ServiceProfile`] adds service specific headers.
//! - [`ResolveEndpoint`] implementations turn endpoint urls into identities.
//! - [`CanonicalRequestBuilder`] and [`SignatureEngine`] implement the algorithm.
//! - [`RequestSigner`] plugs the engine into [`awssign_core::Signer`].
//! - [`RequestPreparer`] builds complete signed `http::Request`s from defaults.
//!
//! ## Example
//!
//! ```no_run
//! use awssign_v4::{RequestSigner, ServiceIdentity, StaticCredentialProvider};
//! use awssign_core::{Context, Result, Signer};
//!
//! # async fn example() -> Result<()> {
//! let identity = ServiceIdentity::new("sqs.us-east-1.amazonaws.com", "sqs", "us-east-1")?;
//! let signer = Signer::new(
//!     Context::new(),
//!     StaticCredentialProvider::new("access_key_id", "secret_access_key"),
//!     RequestSigner::new(identity),
//! );
//!
//! let (mut parts, body) = http::Request::get("https://sqs.us-east-1.amazonaws.com/")
//!     .body(bytes::Bytes::new())?
//!     .into_parts();
//! signer.sign(&mut parts, body).await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;

mod identity;
pub use identity::{merge_required_headers, RequiredHeaders, ServiceIdentity, ServiceProfile};

mod endpoint;
pub use endpoint::{
    ApiGatewayEndpoint, CustomEndpoint, Endpoint, ExplicitEndpoint, ResolveEndpoint,
    StandardEndpoint,
};

mod canonical;
pub use canonical::CanonicalRequestBuilder;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::{RequestSigner, SignatureEngine};

mod provide_credential;
pub use provide_credential::*;

mod config;
pub use config::Config;

mod prepare;
pub use prepare::{PreparedRequest, RequestPreparer};
