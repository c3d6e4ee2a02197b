use bytes::Bytes;
use http::header::HeaderName;
use http::request::Parts;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;

use crate::Result;

/// Description of the request to sign.
///
/// It carries everything the signing engine reads from a request and nothing else. The
/// signing time is passed next to it instead of being stored here.
#[derive(Debug, Clone)]
pub struct RequestDescription {
    /// HTTP method.
    pub method: Method,
    /// HTTP path, may still be percent encoded.
    pub path: String,
    /// Decoded query parameters in request order. A key may repeat.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
    /// Request body.
    pub payload: Bytes,
}

impl RequestDescription {
    /// Create a new description with empty query, headers and payload.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            payload: Bytes::new(),
        }
    }

    /// Build a description from `http::request::Parts` and the request body.
    ///
    /// Query values are percent decoded. Every pair is kept, so repeated keys are
    /// signed the same way they are sent.
    pub fn from_parts(parts: &Parts, payload: impl Into<Bytes>) -> Self {
        let query = parts
            .uri
            .query()
            .map(|v| {
                form_urlencoded::parse(v.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            query,
            headers: parts.headers.clone(),
            payload: payload.into(),
        }
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a header, replacing any existing value for the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Get header names as lower-cased strings.
    pub fn header_names(&self) -> Vec<&str> {
        self.headers.keys().map(|k| k.as_str()).collect()
    }
}

/// Merge signing headers into `http::request::Parts`.
///
/// Signing headers replace existing headers with the same name.
pub fn apply_headers(parts: &mut Parts, headers: HeaderMap) {
    let mut last = None;
    for (name, value) in headers {
        // `None` means the value belongs to the previous header name.
        let name = match name {
            Some(name) => {
                last = Some(name.clone());
                parts.headers.insert(name, value);
                continue;
            }
            None => last.clone(),
        };
        if let Some(name) = name {
            parts.headers.append(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts(uri: &str) -> Parts {
        http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0
    }

    #[test]
    fn test_from_parts() {
        let p = parts("https://foo.bar-region.amazonaws.com/a%20b?b=2&a=1&foo+bar=x%2Fy&a=3");
        let req = RequestDescription::from_parts(&p, "hello");

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/a%20b");
        assert_eq!(
            req.query,
            vec![
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "1".to_string()),
                ("foo bar".to_string(), "x/y".to_string()),
                ("a".to_string(), "3".to_string()),
            ]
        );
        assert_eq!(req.header_names(), vec!["content-type"]);
        assert_eq!(req.payload, Bytes::from_static(b"hello"));
    }

    #[test]
    fn test_with_header_is_case_insensitive() -> Result<()> {
        let req = RequestDescription::new(Method::GET, "/")
            .with_header("X-Amz-Target", "first")?
            .with_header("x-amz-target", "second")?;

        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers["x-amz-target"], "second");
        Ok(())
    }

    #[test]
    fn test_with_header_rejects_invalid_name() {
        let err = RequestDescription::new(Method::GET, "/")
            .with_header("bad header", "v")
            .expect_err("must fail");
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_apply_headers() {
        let mut p = parts("https://example.com/");
        let mut signed = HeaderMap::new();
        signed.insert("content-type", HeaderValue::from_static("text/plain"));
        signed.insert("x-amz-date", HeaderValue::from_static("20160101T000000Z"));

        apply_headers(&mut p, signed);

        assert_eq!(p.headers.len(), 2);
        assert_eq!(p.headers["content-type"], "text/plain");
        assert_eq!(p.headers["x-amz-date"], "20160101T000000Z");
    }
}
