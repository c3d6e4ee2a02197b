use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use awssign_core::{Error, Result};

use crate::constants::*;

/// Required headers of a service: lower-cased name to a fixed value, or `None` when the
/// value is only known per request.
pub type RequiredHeaders = BTreeMap<String, Option<String>>;

/// Merge `overrides` into a copy of `base`.
///
/// The result is the union of both header sets. Values from `overrides` win for names
/// present on both sides, names are never removed.
pub fn merge_required_headers(base: &RequiredHeaders, overrides: &RequiredHeaders) -> RequiredHeaders {
    let mut merged = base.clone();
    for (name, value) in overrides {
        merged.insert(name.to_lowercase(), value.clone());
    }
    merged
}

/// ServiceIdentity describes the service a request is signed for.
///
/// It's immutable once built: every `with_*` method consumes the identity and returns a
/// new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    scheme: String,
    host: String,
    service: String,
    region: String,
    algorithm: String,
    signing_scope: String,
    required_headers: RequiredHeaders,
}

impl ServiceIdentity {
    /// Create a new identity with SigV4 defaults.
    ///
    /// Returns [`ErrorKind::InvalidIdentity`](awssign_core::ErrorKind::InvalidIdentity) if
    /// any of the fields is empty.
    pub fn new(host: &str, service: &str, region: &str) -> Result<Self> {
        for (field, value) in [("host", host), ("service", service), ("region", region)] {
            if value.trim().is_empty() {
                return Err(Error::invalid_identity(format!(
                    "service identity requires a non-empty {field}"
                )));
            }
        }

        let required_headers = RequiredHeaders::from([
            (HOST.to_string(), Some(host.to_string())),
            (X_AMZ_DATE.to_string(), None),
        ]);

        Ok(Self {
            scheme: HTTPS.to_string(),
            host: host.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            algorithm: AWS4_HMAC_SHA256.to_string(),
            signing_scope: AWS4_REQUEST.to_string(),
            required_headers,
        })
    }

    /// Set the url scheme, `https` by default.
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    /// Set the algorithm id, `AWS4-HMAC-SHA256` by default.
    pub fn with_algorithm(mut self, algorithm: &str) -> Self {
        self.algorithm = algorithm.to_string();
        self
    }

    /// Set the signing scope, `aws4_request` by default.
    pub fn with_signing_scope(mut self, signing_scope: &str) -> Self {
        self.signing_scope = signing_scope.to_string();
        self
    }

    /// Add required headers on top of the existing ones.
    pub fn with_required_headers(mut self, headers: &RequiredHeaders) -> Self {
        self.required_headers = merge_required_headers(&self.required_headers, headers);
        self
    }

    /// Add the required headers of a service profile.
    pub fn with_profile(self, profile: &ServiceProfile) -> Self {
        self.with_required_headers(&profile.headers)
    }

    /// Url of the service: `scheme://host`.
    pub fn url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Url scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Service host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Service name, for example `s3` or `execute-api`.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Service region.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Algorithm id.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Signing scope.
    pub fn signing_scope(&self) -> &str {
        &self.signing_scope
    }

    /// Required headers, always containing `host` and `x-amz-date`.
    pub fn required_headers(&self) -> &RequiredHeaders {
        &self.required_headers
    }
}

impl Display for ServiceIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "host={}", self.host)?;
        writeln!(f, "service={}", self.service)?;
        writeln!(f, "region={}", self.region)?;
        writeln!(f, "algorithm={}", self.algorithm)?;
        writeln!(f, "signing_scope={}", self.signing_scope)?;
        let names = self
            .required_headers
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>();
        write!(f, "headers={}", names.join(";"))
    }
}

/// ServiceProfile holds the extra headers a service requires to be signed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceProfile {
    name: String,
    headers: RequiredHeaders,
}

impl ServiceProfile {
    /// Create an empty profile.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            headers: RequiredHeaders::new(),
        }
    }

    /// Require a header, with a fixed value or `None` if the caller provides it per request.
    pub fn with_header(mut self, name: &str, value: Option<&str>) -> Self {
        self.headers
            .insert(name.to_lowercase(), value.map(str::to_string));
        self
    }

    /// Profile for DynamoDB's JSON protocol.
    pub fn dynamodb() -> Self {
        Self::new("dynamodb")
            .with_header(CONTENT_TYPE, Some("application/x-amz-json-1.0"))
            .with_header(X_AMZ_TARGET, None)
    }

    /// Profile name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Headers required by this profile.
    pub fn headers(&self) -> &RequiredHeaders {
        &self.headers
    }
}
