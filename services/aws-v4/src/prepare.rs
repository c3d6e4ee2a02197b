use awssign_core::merge::merge;
use awssign_core::time::{now, DateTime};
use awssign_core::{Error, RequestDescription, Result, Signer};
use bytes::Bytes;
use http::header::HeaderName;
use http::{HeaderMap, HeaderValue, Request};
use log::debug;
use serde_json::{Map, Value};

use crate::{CanonicalRequestBuilder, Credential, Endpoint, ServiceIdentity};

const HEADERS: &str = "headers";

/// A signed request ready to be sent by an HTTP client.
#[derive(Debug)]
pub struct PreparedRequest {
    /// The request with absolute url, merged headers and body.
    pub request: Request<Bytes>,
    /// Client options from the defaults besides `headers`, for example a timeout.
    pub options: Map<String, Value>,
}

/// RequestPreparer turns request descriptions into signed requests for one service.
///
/// Request defaults are a JSON object whose `headers` key holds default headers. Any
/// other key is passed through to [`PreparedRequest::options`]. Headers are layered as
/// defaults, then the request's own headers, then the signing headers. Required headers
/// of the identity with a fixed value, like `host`, are added when missing.
#[derive(Debug, Clone)]
pub struct RequestPreparer {
    identity: ServiceIdentity,
    stage: Option<String>,
    signer: Signer<Credential>,
    defaults: Value,
}

impl RequestPreparer {
    /// Create a new preparer.
    ///
    /// Use [`RequestSigner`](crate::RequestSigner) in `signer` to sign requests, or
    /// [`NoopSigner`](awssign_core::NoopSigner) to send them anonymously.
    pub fn new(identity: ServiceIdentity, signer: Signer<Credential>) -> Self {
        Self {
            identity,
            stage: None,
            signer,
            defaults: Value::Object(Map::new()),
        }
    }

    /// Create a new preparer from a resolved endpoint, keeping its stage.
    pub fn from_endpoint(endpoint: Endpoint, signer: Signer<Credential>) -> Self {
        let (identity, stage) = endpoint.into_parts();
        let mut preparer = Self::new(identity, signer);
        preparer.stage = stage;
        preparer
    }

    /// Set the path prefix of every request.
    pub fn with_stage(mut self, stage: &str) -> Self {
        self.stage = Some(stage.trim_matches('/').to_string());
        self
    }

    /// Merge `defaults` into the request defaults.
    ///
    /// Fails with [`ErrorKind::MismatchedHeaderType`](awssign_core::ErrorKind::MismatchedHeaderType)
    /// if a key already holds a value of another kind.
    pub fn with_defaults(mut self, defaults: Value) -> Result<Self> {
        merge(&mut self.defaults, &defaults)?;
        Ok(self)
    }

    /// Identity requests are prepared for.
    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    /// Prepare the request with the current time.
    pub async fn prepare(&self, req: RequestDescription) -> Result<PreparedRequest> {
        self.prepare_at(req, now()).await
    }

    /// Prepare the request at the given time.
    pub async fn prepare_at(
        &self,
        mut req: RequestDescription,
        time: DateTime,
    ) -> Result<PreparedRequest> {
        req.path = self.normalize_path(&req.path);

        let mut options = self.defaults.clone();
        merge(&mut options, &headers_to_value(&req.headers)?)?;
        let Value::Object(mut options) = options else {
            return Err(Error::unexpected("request defaults must be an object"));
        };
        let mut headers = match options.remove(HEADERS) {
            Some(v) => value_to_headers(&v)?,
            None => HeaderMap::new(),
        };
        // Fixed required headers are signed, so they must be sent too.
        for (name, value) in self.identity.required_headers() {
            let Some(value) = value else { continue };
            let name = HeaderName::from_bytes(name.as_bytes())?;
            if !headers.contains_key(&name) {
                headers.insert(name, HeaderValue::from_str(value)?);
            }
        }
        req.headers = headers;

        let signing_headers = self.signer.signing_headers(&req, time).await?;
        for (name, value) in signing_headers {
            if let Some(name) = name {
                req.headers.insert(name, value);
            }
        }

        let url = self.url(&req)?;
        debug!("prepared request {} {url}", req.method);

        let mut builder = Request::builder().method(req.method).uri(url);
        if let Some(h) = builder.headers_mut() {
            *h = req.headers;
        }
        let request = builder.body(req.payload)?;

        Ok(PreparedRequest { request, options })
    }

    /// Add the leading `/` and the stage prefix.
    fn normalize_path(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        match &self.stage {
            Some(stage) if path.is_empty() => format!("/{stage}"),
            Some(stage) => format!("/{stage}/{path}"),
            None => format!("/{path}"),
        }
    }

    /// Build `scheme://host/path[?query]` with the same encoding as the signature.
    fn url(&self, req: &RequestDescription) -> Result<String> {
        let mut url = self.identity.url();
        url.push_str(&CanonicalRequestBuilder::canonical_uri(&req.path)?);
        let qs =
            CanonicalRequestBuilder::canonical_query_string(req.query.iter().map(|(k, v)| (k, v)));
        if !qs.is_empty() {
            url.push('?');
            url.push_str(&qs);
        }
        Ok(url)
    }
}

/// Build `{"headers": {name: value}}`, a repeated name keeps its last value.
fn headers_to_value(headers: &HeaderMap) -> Result<Value> {
    let mut m = Map::new();
    for (name, value) in headers {
        m.insert(
            name.as_str().to_string(),
            Value::String(value.to_str()?.to_string()),
        );
    }
    Ok(Value::Object(Map::from_iter([(
        HEADERS.to_string(),
        Value::Object(m),
    )])))
}

fn value_to_headers(value: &Value) -> Result<HeaderMap> {
    let Value::Object(m) = value else {
        return Err(Error::mismatched_header_type(format!(
            "{HEADERS} must be an object, got {value}"
        )));
    };

    let mut headers = HeaderMap::with_capacity(m.len());
    for (name, value) in m {
        let value = match value {
            Value::String(v) => v.clone(),
            Value::Number(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            _ => {
                return Err(Error::mismatched_header_type(format!(
                    "header {name} must be a scalar, got {value}"
                )))
            }
        };
        headers.insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(&value)?,
        );
    }
    Ok(headers)
}
