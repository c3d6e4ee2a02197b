use std::fmt::Write;

use awssign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use awssign_core::time::{format_date, format_iso8601, DateTime};
use awssign_core::{Error, RequestDescription, Result, SignRequest};
use http::header::{HeaderName, AUTHORIZATION};
use http::{HeaderMap, HeaderValue};
use log::debug;

use crate::constants::{X_AMZ_DATE, X_AMZ_SECURITY_TOKEN};
use crate::{CanonicalRequestBuilder, Credential, ServiceIdentity};

/// SignatureEngine derives SigV4 signatures for an identity.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
#[derive(Debug, Clone, Copy)]
pub struct SignatureEngine<'a> {
    identity: &'a ServiceIdentity,
}

impl<'a> SignatureEngine<'a> {
    /// Create a new engine for the given identity.
    pub fn new(identity: &'a ServiceIdentity) -> Self {
        Self { identity }
    }

    /// Derive the signing key, returned as raw bytes.
    ///
    /// ```shell
    /// kDate    = HMAC("AWS4" + secret, datestamp)
    /// kRegion  = HMAC(kDate, region)
    /// kService = HMAC(kRegion, service)
    /// kSigning = HMAC(kService, signing scope)
    /// ```
    ///
    /// The key only depends on the day, so callers may cache it for a whole UTC day.
    pub fn derive_signing_key(&self, datestamp: &str, cred: &Credential) -> Vec<u8> {
        // Sign secret
        let secret = format!("AWS4{}", cred.secret_access_key);
        // Sign date
        let sign_date = hmac_sha256(secret.as_bytes(), datestamp.as_bytes());
        // Sign region
        let sign_region = hmac_sha256(sign_date.as_slice(), self.identity.region().as_bytes());
        // Sign service
        let sign_service = hmac_sha256(sign_region.as_slice(), self.identity.service().as_bytes());
        // Sign request
        hmac_sha256(
            sign_service.as_slice(),
            self.identity.signing_scope().as_bytes(),
        )
    }

    /// Build the string to sign.
    ///
    /// ```shell
    /// AWS4-HMAC-SHA256
    /// 20220313T072004Z
    /// 20220313/<region>/<service>/aws4_request
    /// <hashed_canonical_request>
    /// ```
    pub fn string_to_sign(
        &self,
        amzdate: &str,
        credential_scope: &str,
        canonical_request: &str,
    ) -> Result<String> {
        let mut f = String::with_capacity(128);
        writeln!(f, "{}", self.identity.algorithm())?;
        writeln!(f, "{amzdate}")?;
        writeln!(f, "{credential_scope}")?;
        write!(f, "{}", hex_sha256(canonical_request.as_bytes()))?;
        Ok(f)
    }

    /// Hex encoded signature of `string_to_sign`.
    pub fn signature(&self, datestamp: &str, string_to_sign: &str, cred: &Credential) -> String {
        let signing_key = self.derive_signing_key(datestamp, cred);
        hex_hmac_sha256(&signing_key, string_to_sign.as_bytes())
    }

    /// Build the value of the `Authorization` header.
    pub fn authorization_header(
        &self,
        credential_scope: &str,
        signed_headers: &str,
        signature: &str,
        cred: &Credential,
    ) -> String {
        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            self.identity.algorithm(),
            cred.access_key_id,
            credential_scope,
            signed_headers,
            signature
        )
    }

    /// Sign the request at `time`.
    ///
    /// Returns the headers to merge into the outgoing request: `x-amz-date`,
    /// `authorization` and, if the credential carries a session token,
    /// `x-amz-security-token`.
    pub fn sign(
        &self,
        cred: &Credential,
        req: &RequestDescription,
        time: DateTime,
    ) -> Result<HeaderMap> {
        let amzdate = format_iso8601(time);
        let datestamp = format_date(time);
        let builder = CanonicalRequestBuilder::new(self.identity);

        // Headers from an earlier signing pass are replaced below and must not be signed.
        let mut req_headers = req.headers.clone();
        req_headers.remove(AUTHORIZATION);
        req_headers.remove(X_AMZ_SECURITY_TOKEN);

        let qs =
            CanonicalRequestBuilder::canonical_query_string(req.query.iter().map(|(k, v)| (k, v)));
        let creq = builder.canonical_request(
            &amzdate,
            &req.path,
            &req.method,
            &qs,
            &req_headers,
            &req.payload,
        )?;
        debug!("calculated canonical request: {creq}");

        // Scope: "20220313/<region>/<service>/aws4_request"
        let scope = builder.credential_scope(&datestamp);
        debug!("calculated scope: {scope}");

        let string_to_sign = self.string_to_sign(&amzdate, &scope, &creq)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signed_headers = builder.signed_headers(req_headers.keys().map(|k| k.as_str()));
        let signature = self.signature(&datestamp, &string_to_sign, cred);

        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(
            HeaderName::from_static(X_AMZ_DATE),
            HeaderValue::try_from(amzdate)?,
        );

        let mut authorization = HeaderValue::from_str(&self.authorization_header(
            &scope,
            &signed_headers,
            &signature,
            cred,
        ))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        if let Some(token) = &cred.session_token {
            let mut value = HeaderValue::from_str(token)?;
            // Set token value sensitive to avoid leaking.
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(X_AMZ_SECURITY_TOKEN), value);
        }

        Ok(headers)
    }
}

/// RequestSigner that implement AWS SigV4 for a service identity.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    identity: ServiceIdentity,
}

impl RequestSigner {
    /// Create a new signer for the given identity.
    pub fn new(identity: ServiceIdentity) -> Self {
        Self { identity }
    }

    /// Identity this signer signs for.
    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }
}

impl SignRequest for RequestSigner {
    type Credential = Credential;

    fn sign_request(
        &self,
        req: &RequestDescription,
        credential: Option<&Self::Credential>,
        now: DateTime,
    ) -> Result<HeaderMap> {
        let Some(cred) = credential else {
            return Err(Error::credentials_required(format!(
                "signing request for service {} requires credentials",
                self.identity.service()
            )));
        };
        if !cred.is_valid_at(now) {
            return Err(Error::credential_invalid(format!(
                "credential {cred:?} is empty or expired"
            )));
        }

        SignatureEngine::new(&self.identity).sign(cred, req, now)
    }
}
