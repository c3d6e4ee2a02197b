use crate::time::DateTime;
use crate::{Context, RequestDescription, Result};
use http::HeaderMap;
use log::debug;
use std::fmt::Debug;
use std::marker::PhantomData;

/// SigningCredential is the trait used by signer as the signing credential.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is valid.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        let Some(cred) = self else {
            return false;
        };

        cred.is_valid()
    }
}

/// ProvideCredential is the trait used by signer to load the credential from the environment.
///
/// Acquiring credentials (env, static values, remote endpoints) is kept apart from
/// signing so that the signing engine never performs I/O.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load signing credential from current env.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}

/// SignRequest is the trait used by signer to compute the headers that authenticate a request.
///
/// Implementations must be pure: the same request, credential and time always yield
/// the same headers.
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync + Unpin + 'static;

    /// Compute the headers to merge into the outgoing request.
    ///
    /// ## Credential
    ///
    /// Signers that need a credential must fail with
    /// [`ErrorKind::CredentialsRequired`](crate::ErrorKind::CredentialsRequired)
    /// when `credential` is `None`.
    ///
    /// ## Time
    ///
    /// `now` is always supplied by the caller so that signing stays reproducible.
    fn sign_request(
        &self,
        req: &RequestDescription,
        credential: Option<&Self::Credential>,
        now: DateTime,
    ) -> Result<HeaderMap>;
}

/// NoopSigner leaves requests unsigned.
///
/// Use it in place of a real signer for endpoints that accept anonymous requests.
pub struct NoopSigner<K> {
    _credential: PhantomData<fn() -> K>,
}

impl<K> NoopSigner<K> {
    /// Create a new NoopSigner.
    pub fn new() -> Self {
        Self {
            _credential: PhantomData,
        }
    }
}

impl<K> Default for NoopSigner<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Debug for NoopSigner<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NoopSigner")
    }
}

impl<K: Send + Sync + Unpin + 'static> SignRequest for NoopSigner<K> {
    type Credential = K;

    fn sign_request(
        &self,
        req: &RequestDescription,
        _: Option<&Self::Credential>,
        _: DateTime,
    ) -> Result<HeaderMap> {
        debug!("request {} {} left unsigned", req.method, req.path);
        Ok(HeaderMap::new())
    }
}
