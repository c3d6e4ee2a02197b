use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use awssign_core::hash::hex_sha256;
use awssign_core::{Error, Result};
use http::{HeaderMap, Method};
use percent_encoding::{percent_decode_str, utf8_percent_encode};

use crate::constants::*;
use crate::ServiceIdentity;

/// CanonicalRequestBuilder turns a request into the canonical forms of SigV4.
///
/// - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#create-canonical-request)
///
/// The builder holds no state besides the borrowed identity, every method is a pure
/// function of its arguments.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalRequestBuilder<'a> {
    identity: &'a ServiceIdentity,
}

impl<'a> CanonicalRequestBuilder<'a> {
    /// Create a new builder for the given identity.
    pub fn new(identity: &'a ServiceIdentity) -> Self {
        Self { identity }
    }

    /// Build the canonical query string.
    ///
    /// Keys and values are encoded with RFC 3986 rules, so a space becomes `%20` and
    /// never `+`. Pairs are sorted by key, then by value.
    ///
    /// ```shell
    /// {"foo bar": "1", "baz": "2"} => "baz=2&foo%20bar=1"
    /// ```
    pub fn canonical_query_string<K, V>(params: impl IntoIterator<Item = (K, V)>) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pairs = params
            .into_iter()
            .map(|(k, v)| {
                (
                    utf8_percent_encode(k.as_ref(), &AWS_QUERY_ENCODE_SET).to_string(),
                    utf8_percent_encode(v.as_ref(), &AWS_QUERY_ENCODE_SET).to_string(),
                )
            })
            .collect::<Vec<_>>();
        // Sort by encoded key first, value second.
        pairs.sort();

        pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Build the canonical headers block.
    ///
    /// Required headers of the identity are merged with `headers`; the caller's values
    /// win, except `x-amz-date` which is always `amzdate`. Each header is rendered as
    /// `name:value\n` with the value trimmed, sorted by name.
    pub fn canonical_headers(&self, headers: &HeaderMap, amzdate: &str) -> Result<String> {
        let mut merged = BTreeMap::new();
        for (name, value) in self.identity.required_headers() {
            if let Some(value) = value {
                merged.insert(name.to_string(), value.to_string());
            }
        }
        // HeaderName is always lower-cased, a repeated name keeps its last value.
        for (name, value) in headers {
            merged.insert(name.as_str().to_string(), value.to_str()?.to_string());
        }
        merged.insert(X_AMZ_DATE.to_string(), amzdate.to_string());

        if let Some(name) = self
            .identity
            .required_headers()
            .keys()
            .find(|name| !merged.contains_key(name.as_str()))
        {
            return Err(Error::request_invalid(format!(
                "required header {name} has no value"
            )));
        }

        let mut s = String::with_capacity(256);
        for (name, value) in merged {
            writeln!(s, "{name}:{}", value.trim())?;
        }
        Ok(s)
    }

    /// Build the signed headers string: the sorted, de-duplicated union of the required
    /// header names and `names`, lower-cased and joined by `;`.
    pub fn signed_headers<N: AsRef<str>>(&self, names: impl IntoIterator<Item = N>) -> String {
        let mut set = self
            .identity
            .required_headers()
            .keys()
            .map(|k| k.to_lowercase())
            .collect::<BTreeSet<_>>();
        set.extend(names.into_iter().map(|k| k.as_ref().to_lowercase()));

        set.into_iter().collect::<Vec<_>>().join(";")
    }

    /// Build the canonical uri.
    ///
    /// The path is percent decoded first and then encoded again, so an already encoded
    /// path is not encoded twice. An empty path becomes `/`.
    pub fn canonical_uri(path: &str) -> Result<String> {
        if path.is_empty() {
            return Ok("/".to_string());
        }

        let decoded = percent_decode_str(path)
            .decode_utf8()
            .map_err(|e| Error::request_invalid("request path is not valid utf-8").with_source(e))?;
        Ok(utf8_percent_encode(&decoded, &AWS_URI_ENCODE_SET).to_string())
    }

    /// Build the canonical request.
    ///
    /// ```shell
    /// GET
    /// /
    /// <canonical query string>
    /// host:foo-service.bar-region.amazonaws.com
    /// x-amz-date:20160101T000000Z
    ///
    /// host;x-amz-date
    /// e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855
    /// ```
    ///
    /// `payload` can be text or bytes; text is hashed as UTF-8.
    pub fn canonical_request(
        &self,
        amzdate: &str,
        uri: &str,
        method: &Method,
        qs: &str,
        headers: &HeaderMap,
        payload: impl AsRef<[u8]>,
    ) -> Result<String> {
        let lines = [
            method.as_str().to_string(),
            Self::canonical_uri(uri)?,
            qs.to_string(),
            self.canonical_headers(headers, amzdate)?,
            self.signed_headers(headers.keys().map(|k| k.as_str())),
            Self::payload_hash(payload),
        ];
        Ok(lines.join("\n"))
    }

    /// Hex encoded SHA256 of the payload.
    pub fn payload_hash(payload: impl AsRef<[u8]>) -> String {
        let payload = payload.as_ref();
        if payload.is_empty() {
            return EMPTY_PAYLOAD_SHA256.to_string();
        }
        hex_sha256(payload)
    }

    /// Build the credential scope: `<datestamp>/<region>/<service>/<signing scope>`.
    pub fn credential_scope(&self, datestamp: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            datestamp,
            self.identity.region(),
            self.identity.service(),
            self.identity.signing_scope()
        )
    }
}
