use crate::request::apply_headers;
use crate::time::{now, DateTime};
use crate::{Context, ProvideCredential, RequestDescription, Result, SignRequest, SigningCredential};
use bytes::Bytes;
use http::HeaderMap;
use log::debug;
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// Both the credential provider and the request signer are injected at construction,
/// so unsigned clients use [`NoopSigner`](crate::NoopSigner) instead of a different type.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            provider: Arc::new(provider),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Load the credential, reusing the cached one while it stays valid.
    async fn credential(&self) -> Result<Option<K>> {
        let cred = self.credential.lock().expect("lock poisoned").clone();
        if cred.is_valid() {
            return Ok(cred);
        }

        debug!("cached credential is missing or expired, loading a new one");
        let cred = self.provider.provide_credential(&self.ctx).await?;
        *self.credential.lock().expect("lock poisoned") = cred.clone();
        Ok(cred)
    }

    /// Compute the signing headers for a request at the given time.
    pub async fn signing_headers(
        &self,
        req: &RequestDescription,
        time: DateTime,
    ) -> Result<HeaderMap> {
        let cred = self.credential().await?;
        self.builder.sign_request(req, cred.as_ref(), time)
    }

    /// Sign request in place with the current time.
    pub async fn sign(&self, parts: &mut http::request::Parts, body: impl Into<Bytes>) -> Result<()> {
        self.sign_at(parts, body, now()).await
    }

    /// Sign request in place at the given time.
    pub async fn sign_at(
        &self,
        parts: &mut http::request::Parts,
        body: impl Into<Bytes>,
        time: DateTime,
    ) -> Result<()> {
        let req = RequestDescription::from_parts(parts, body);
        let headers = self.signing_headers(&req, time).await?;
        apply_headers(parts, headers);
        Ok(())
    }
}
