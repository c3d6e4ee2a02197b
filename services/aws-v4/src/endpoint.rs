use awssign_core::{Error, Result};
use http::Uri;
use log::debug;

use crate::constants::{HTTP, HTTPS};
use crate::ServiceIdentity;

const AMAZONAWS_SUFFIX: &str = ".amazonaws.com";

/// Endpoint is a resolved endpoint url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    identity: ServiceIdentity,
    stage: Option<String>,
}

impl Endpoint {
    /// Identity of the service behind this endpoint.
    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    /// API Gateway stage, used as path prefix for every request.
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    /// Split the endpoint into its identity and stage.
    pub fn into_parts(self) -> (ServiceIdentity, Option<String>) {
        (self.identity, self.stage)
    }
}

/// ResolveEndpoint turns an endpoint url into a service identity.
pub trait ResolveEndpoint {
    /// Resolve the url, failing with [`ErrorKind::UrlParse`](awssign_core::ErrorKind::UrlParse)
    /// if it doesn't match.
    fn resolve(&self, url: &str) -> Result<Endpoint>;
}

/// Resolves `[https://]<service>.<region>.amazonaws.com[:port]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEndpoint;

impl StandardEndpoint {
    const FORMAT: &'static str = "[https://]<service>.<region>.amazonaws.com";
}

impl ResolveEndpoint for StandardEndpoint {
    fn resolve(&self, url: &str) -> Result<Endpoint> {
        let err = || Error::url_parse(url, Self::FORMAT);

        let parsed = parse_url(url).ok_or_else(err)?;
        if parsed.scheme() != HTTPS || !parsed.path().is_empty() {
            return Err(err());
        }
        let labels = amazonaws_labels(parsed.host()).ok_or_else(err)?;
        let [service, region] = labels[..] else {
            return Err(err());
        };

        let identity = ServiceIdentity::new(parsed.authority(), service, region)?;
        debug!("resolved {url} as service {service} in region {region}");
        Ok(Endpoint {
            identity,
            stage: None,
        })
    }
}

/// Resolves API Gateway urls: `[https://]<api-id>.<service>.<region>.amazonaws.com/<stage>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiGatewayEndpoint;

impl ApiGatewayEndpoint {
    const FORMAT: &'static str = "[https://]<api-id>.<service>.<region>.amazonaws.com/<stage>";
}

impl ResolveEndpoint for ApiGatewayEndpoint {
    fn resolve(&self, url: &str) -> Result<Endpoint> {
        let err = || Error::url_parse(url, Self::FORMAT);

        let parsed = parse_url(url).ok_or_else(err)?;
        if parsed.scheme() != HTTPS {
            return Err(err());
        }
        let labels = amazonaws_labels(parsed.host()).ok_or_else(err)?;
        let [_, service, region] = labels[..] else {
            return Err(err());
        };
        let stage = parsed.path().strip_prefix('/').ok_or_else(err)?;
        if !is_label(stage) || stage.contains('-') {
            return Err(err());
        }

        let identity = ServiceIdentity::new(parsed.authority(), service, region)?;
        debug!("resolved {url} as service {service} in region {region} with stage {stage}");
        Ok(Endpoint {
            identity,
            stage: Some(stage.to_string()),
        })
    }
}

/// Resolves AWS compatible endpoints outside of `amazonaws.com`:
/// `[http[s]://]<service>.<region>[.<domain>...][:port]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomEndpoint;

impl CustomEndpoint {
    const FORMAT: &'static str = "[http[s]://]<service>.<region>[.<domain>...][:port]";
}

impl ResolveEndpoint for CustomEndpoint {
    fn resolve(&self, url: &str) -> Result<Endpoint> {
        let err = || Error::url_parse(url, Self::FORMAT);

        let parsed = parse_url(url).ok_or_else(err)?;
        if !parsed.path().is_empty() {
            return Err(err());
        }
        let labels = parsed.host().split('.').collect::<Vec<_>>();
        if labels.len() < 2 || !labels.iter().all(|v| is_label(v)) {
            return Err(err());
        }

        let identity = ServiceIdentity::new(parsed.authority(), labels[0], labels[1])?
            .with_scheme(parsed.scheme());
        debug!("resolved {url} as service {} in region {}", labels[0], labels[1]);
        Ok(Endpoint {
            identity,
            stage: None,
        })
    }
}

/// Resolves any `[http[s]://]<host>[:port]` to a known service and region.
///
/// Used for AWS compatible servers whose host says nothing about the service, such as
/// `http://localhost:9000`.
#[derive(Debug, Clone)]
pub struct ExplicitEndpoint {
    service: String,
    region: String,
}

impl ExplicitEndpoint {
    const FORMAT: &'static str = "[http[s]://]<host>[:port]";

    /// Create a resolver that signs for `service` in `region`.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.to_string(),
            region: region.to_string(),
        }
    }
}

impl ResolveEndpoint for ExplicitEndpoint {
    fn resolve(&self, url: &str) -> Result<Endpoint> {
        let err = || Error::url_parse(url, Self::FORMAT);

        let parsed = parse_url(url).ok_or_else(err)?;
        if !parsed.path().is_empty() {
            return Err(err());
        }

        let identity = ServiceIdentity::new(parsed.authority(), &self.service, &self.region)?
            .with_scheme(parsed.scheme());
        debug!(
            "resolved {url} as service {} in region {}",
            self.service, self.region
        );
        Ok(Endpoint {
            identity,
            stage: None,
        })
    }
}

/// An endpoint url parsed with [`Uri`].
struct ParsedUrl {
    uri: Uri,
}

impl ParsedUrl {
    fn scheme(&self) -> &str {
        self.uri.scheme_str().unwrap_or(HTTPS)
    }

    /// `host[:port]`, used as the `host` header.
    fn authority(&self) -> &str {
        self.uri.authority().map(|v| v.as_str()).unwrap_or_default()
    }

    fn host(&self) -> &str {
        self.uri.host().unwrap_or_default()
    }

    /// Path without the single trailing `/` of a bare host.
    fn path(&self) -> &str {
        match self.uri.path() {
            "/" => "",
            path => path,
        }
    }
}

/// Parse an endpoint url, `https` is assumed when the scheme is missing.
///
/// Only `http` and `https` are accepted. Urls carrying user info or a query string are
/// rejected, they can't be sent as an endpoint.
fn parse_url(url: &str) -> Option<ParsedUrl> {
    let uri = if url.contains("://") {
        url.parse::<Uri>()
    } else {
        format!("{HTTPS}://{url}").parse::<Uri>()
    }
    .ok()?;

    if !matches!(uri.scheme_str(), Some(HTTP | HTTPS)) {
        return None;
    }
    let authority = uri.authority()?;
    if authority.host().is_empty() || authority.as_str().contains('@') || uri.query().is_some() {
        return None;
    }
    Some(ParsedUrl { uri })
}

/// Labels in front of `.amazonaws.com`, all of them must be valid.
fn amazonaws_labels(host: &str) -> Option<Vec<&str>> {
    let prefix = host.strip_suffix(AMAZONAWS_SUFFIX)?;
    let labels = prefix.split('.').collect::<Vec<_>>();
    labels.iter().all(|v| is_label(v)).then_some(labels)
}

/// A label is made of word characters and `-`.
fn is_label(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use awssign_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const HOST: &str = "foo-service.bar-region.amazonaws.com";

    #[test_case(HOST; "without scheme")]
    #[test_case("https://foo-service.bar-region.amazonaws.com"; "with scheme")]
    #[test_case("https://foo-service.bar-region.amazonaws.com/"; "with trailing slash")]
    fn test_standard(url: &str) -> Result<()> {
        let ep = StandardEndpoint.resolve(url)?;

        assert_eq!(ep.identity().host(), HOST);
        assert_eq!(ep.identity().service(), "foo-service");
        assert_eq!(ep.identity().region(), "bar-region");
        assert_eq!(ep.identity().algorithm(), "AWS4-HMAC-SHA256");
        assert_eq!(ep.identity().signing_scope(), "aws4_request");
        assert_eq!(ep.stage(), None);
        Ok(())
    }

    #[test_case("http://foo.bar.amazonaws.com"; "http scheme")]
    #[test_case("https://foo.bar"; "missing suffix")]
    #[test_case("https://foo.amazonaws.com"; "missing region")]
    #[test_case("https://a.foo.bar.amazonaws.com"; "too many labels")]
    #[test_case("https://foo.bar.amazonaws.com/path"; "with path")]
    #[test_case("https://fo o.bar.amazonaws.com"; "invalid label")]
    #[test_case("https://foo.bar.amazonaws.com/?a=b"; "with query")]
    #[test_case("https://user@foo.bar.amazonaws.com"; "with user info")]
    #[test_case("ftp://foo.bar.amazonaws.com"; "unknown scheme")]
    #[test_case(""; "empty")]
    fn test_standard_invalid(url: &str) {
        let err = StandardEndpoint.resolve(url).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::UrlParse);
        assert!(err.to_string().contains(StandardEndpoint::FORMAT), "{err}");
    }

    #[test]
    fn test_standard_with_port() -> Result<()> {
        let ep = StandardEndpoint.resolve("https://s3.us-east-1.amazonaws.com:8443/")?;

        assert_eq!(ep.identity().host(), "s3.us-east-1.amazonaws.com:8443");
        assert_eq!(ep.identity().service(), "s3");
        assert_eq!(ep.identity().region(), "us-east-1");
        assert_eq!(ep.identity().url(), "https://s3.us-east-1.amazonaws.com:8443");
        Ok(())
    }

    #[test]
    fn test_api_gateway() -> Result<()> {
        let ep = ApiGatewayEndpoint.resolve("https://a1b2c3.execute-api.us-east-1.amazonaws.com/prod")?;

        assert_eq!(ep.identity().host(), "a1b2c3.execute-api.us-east-1.amazonaws.com");
        assert_eq!(ep.identity().service(), "execute-api");
        assert_eq!(ep.identity().region(), "us-east-1");
        assert_eq!(ep.stage(), Some("prod"));
        Ok(())
    }

    #[test_case("https://a1b2c3.execute-api.us-east-1.amazonaws.com"; "missing stage")]
    #[test_case("https://a1b2c3.execute-api.us-east-1.amazonaws.com/prod/v1"; "nested stage")]
    #[test_case("https://execute-api.us-east-1.amazonaws.com/prod"; "missing api id")]
    fn test_api_gateway_invalid(url: &str) {
        let err = ApiGatewayEndpoint.resolve(url).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::UrlParse);
    }

    #[test_case("https://foo.bar", "https", "foo.bar", "foo", "bar"; "two labels")]
    #[test_case("minio.local.example.com", "https", "minio.local.example.com", "minio", "local"; "domain")]
    #[test_case("http://minio.local:9000", "http", "minio.local:9000", "minio", "local"; "http with port")]
    fn test_custom(url: &str, scheme: &str, host: &str, service: &str, region: &str) -> Result<()> {
        let (identity, stage) = CustomEndpoint.resolve(url)?.into_parts();

        assert_eq!(identity.scheme(), scheme);
        assert_eq!(identity.host(), host);
        assert_eq!(identity.service(), service);
        assert_eq!(identity.region(), region);
        assert_eq!(stage, None);
        Ok(())
    }

    #[test]
    fn test_custom_invalid() {
        let err = CustomEndpoint.resolve("https://localhost").expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::UrlParse);
    }

    #[test_case("http://localhost:9000", "http", "localhost:9000"; "local server")]
    #[test_case("storage.example.com", "https", "storage.example.com"; "without scheme")]
    fn test_explicit(url: &str, scheme: &str, host: &str) -> Result<()> {
        let ep = ExplicitEndpoint::new("s3", "us-east-1").resolve(url)?;

        assert_eq!(ep.identity().scheme(), scheme);
        assert_eq!(ep.identity().host(), host);
        assert_eq!(ep.identity().service(), "s3");
        assert_eq!(ep.identity().region(), "us-east-1");
        assert_eq!(ep.identity().url(), format!("{scheme}://{host}"));
        Ok(())
    }

    #[test]
    fn test_explicit_invalid() {
        let err = ExplicitEndpoint::new("s3", "us-east-1")
            .resolve("http://localhost:9000/bucket")
            .expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::UrlParse);
    }
}
