use crate::constants::*;
use crate::{
    CustomEndpoint, EnvCredentialProvider, ExplicitEndpoint, ProvideCredentialChain,
    RequestSigner, ResolveEndpoint, ServiceIdentity, StandardEndpoint, StaticCredentialProvider,
};
use awssign_core::utils::Redact;
use awssign_core::{Context, Error, ErrorKind, Result, Signer};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};

/// Config for AWS SigV4 signing.
///
/// Either `endpoint`, or both `service` and `region` must be set to build a
/// [`ServiceIdentity`].
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint url, for example `https://s3.us-east-1.amazonaws.com` or, together with
    /// `service` and `region`, `http://localhost:9000`.
    pub endpoint: Option<String>,
    /// Service name, for example `s3`.
    pub service: Option<String>,
    /// Region, for example `us-east-1`.
    pub region: Option<String>,
    /// Access key id.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("service", &self.service)
            .field("region", &self.region)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .finish()
    }
}

impl Config {
    /// Load config from environment variables.
    pub fn from_env(ctx: &Context) -> Self {
        Self::default().load_env(ctx)
    }

    /// Fill unset fields from environment variables, explicit values win.
    pub fn load_env(mut self, ctx: &Context) -> Self {
        let fields = [
            (&mut self.endpoint, AWS_ENDPOINT_URL),
            (&mut self.region, AWS_REGION),
            (&mut self.access_key_id, AWS_ACCESS_KEY_ID),
            (&mut self.secret_access_key, AWS_SECRET_ACCESS_KEY),
            (&mut self.session_token, AWS_SESSION_TOKEN),
        ];
        for (field, key) in fields {
            if field.is_none() {
                *field = ctx.env_var(key);
            }
        }
        self
    }

    /// Build the service identity.
    ///
    /// `endpoint` is resolved with [`StandardEndpoint`] first, `service` and `region`
    /// must agree with it when set. Other endpoints are resolved with
    /// [`ExplicitEndpoint`] when both `service` and `region` are set, with
    /// [`CustomEndpoint`] otherwise. Without an endpoint, the host is
    /// `<service>.<region>.amazonaws.com`.
    pub fn service_identity(&self) -> Result<ServiceIdentity> {
        if let Some(endpoint) = &self.endpoint {
            return self.resolve_endpoint(endpoint);
        }

        let (Some(service), Some(region)) = (&self.service, &self.region) else {
            return Err(Error::config_invalid(
                "either endpoint or both service and region must be set",
            ));
        };
        ServiceIdentity::new(&format!("{service}.{region}.amazonaws.com"), service, region)
    }

    fn resolve_endpoint(&self, endpoint: &str) -> Result<ServiceIdentity> {
        let identity = match StandardEndpoint.resolve(endpoint) {
            Ok(ep) => ep.into_parts().0,
            Err(err) if err.kind() == ErrorKind::UrlParse => {
                let ep = match (&self.service, &self.region) {
                    (Some(service), Some(region)) => {
                        ExplicitEndpoint::new(service, region).resolve(endpoint)?
                    }
                    _ => CustomEndpoint.resolve(endpoint)?,
                };
                ep.into_parts().0
            }
            Err(err) => return Err(err),
        };

        for (field, configured, resolved) in [
            ("service", &self.service, identity.service()),
            ("region", &self.region, identity.region()),
        ] {
            if let Some(v) = configured {
                if v != resolved {
                    return Err(Error::config_invalid(format!(
                        "{field} {v} doesn't match endpoint {endpoint}"
                    )));
                }
            }
        }
        Ok(identity)
    }

    /// Build a credential provider chain: the configured keys first, then env.
    pub fn credential_provider(&self) -> ProvideCredentialChain {
        let mut chain = ProvideCredentialChain::new();
        if let (Some(ak), Some(sk)) = (&self.access_key_id, &self.secret_access_key) {
            let mut provider = StaticCredentialProvider::new(ak, sk);
            if let Some(token) = &self.session_token {
                provider = provider.with_session_token(token);
            }
            chain = chain.push(provider);
        }
        chain.push(EnvCredentialProvider::new())
    }

    /// Build a signer for this config.
    pub fn signer(&self, ctx: Context) -> Result<Signer<crate::Credential>> {
        let identity = self.service_identity()?;
        Ok(Signer::new(
            ctx,
            self.credential_provider(),
            RequestSigner::new(identity),
        ))
    }
}
