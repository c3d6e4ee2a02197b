//! Shared building blocks of awssign.
//!
//! `awssign-core` knows nothing about SigV4 itself. It holds what every signer needs:
//!
//! - [`Error`] and [`ErrorKind`], the error model of the workspace.
//! - [`Context`] and [`Env`], the only way providers read environment variables.
//! - [`ProvideCredential`] loads credentials, [`SignRequest`] turns a
//!   [`RequestDescription`] into signing headers at a given time.
//! - [`Signer`] caches the credential and applies the signing headers to
//!   `http::request::Parts`.
//!
//! ```no_run
//! use awssign_core::time::{now, DateTime};
//! use awssign_core::{Context, Result, RequestDescription, SignRequest, Signer};
//! use awssign_core::{ProvideCredential, SigningCredential};
//! use http::{HeaderMap, HeaderValue};
//!
//! #[derive(Clone, Debug)]
//! struct Token(String);
//!
//! impl SigningCredential for Token {
//!     fn is_valid(&self) -> bool {
//!         !self.0.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct TokenProvider;
//!
//! #[async_trait::async_trait]
//! impl ProvideCredential for TokenProvider {
//!     type Credential = Token;
//!
//!     async fn provide_credential(&self, ctx: &Context) -> Result<Option<Token>> {
//!         Ok(ctx.env_var("MY_TOKEN").map(Token))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct BearerSigner;
//!
//! impl SignRequest for BearerSigner {
//!     type Credential = Token;
//!
//!     fn sign_request(
//!         &self,
//!         _: &RequestDescription,
//!         cred: Option<&Token>,
//!         _: DateTime,
//!     ) -> Result<HeaderMap> {
//!         let mut headers = HeaderMap::new();
//!         if let Some(cred) = cred {
//!             headers.insert("authorization", HeaderValue::from_str(&cred.0)?);
//!         }
//!         Ok(headers)
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::new(), TokenProvider, BearerSigner);
//! let (mut parts, body) = http::Request::get("https://example.com")
//!     .body(bytes::Bytes::new())?
//!     .into_parts();
//! signer.sign_at(&mut parts, body, now()).await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod merge;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::NoopEnv;
pub use context::OsEnv;
pub use context::StaticEnv;

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{NoopSigner, ProvideCredential, SignRequest, SigningCredential};
mod request;
pub use request::{apply_headers, RequestDescription};
mod signer;
pub use signer::Signer;
