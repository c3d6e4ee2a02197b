//! Vectors from the AWS SigV4 test suite, signed through `Signer`.

use super::{init_signer, suite_time};
use anyhow::Result;
use awssign_core::{Context, Signer};
use awssign_v4::{ServiceIdentity, ServiceProfile, StaticCredentialProvider, RequestSigner};
use http::header::AUTHORIZATION;
use http::{Method, Request};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn identity() -> ServiceIdentity {
    ServiceIdentity::new("example.amazonaws.com", "service", "us-east-1")
        .expect("identity must be valid")
}

fn authorization(signed_headers: &str, signature: &str) -> String {
    format!(
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
         SignedHeaders={signed_headers}, Signature={signature}"
    )
}

#[test_case(
    "https://example.amazonaws.com/",
    "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31";
    "get vanilla"
)]
#[test_case(
    "https://example.amazonaws.com/?Param2=value2&Param1=value1",
    "b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500";
    "get vanilla query order key case"
)]
#[test_case(
    "https://example.amazonaws.com/example%20space/",
    "652487583200325589f1fba4c7e578f72c47cb61beeca81406b39ddec1366741";
    "get space"
)]
#[tokio::test]
async fn test_get(uri: &str, signature: &str) -> Result<()> {
    let signer = init_signer(identity());

    let (mut parts, body) = Request::get(uri).body(bytes::Bytes::new())?.into_parts();
    signer.sign_at(&mut parts, body, suite_time()).await?;

    assert_eq!(parts.headers["x-amz-date"], "20150830T123600Z");
    assert_eq!(
        parts.headers[AUTHORIZATION],
        authorization("host;x-amz-date", signature).as_str()
    );
    Ok(())
}

#[test_case(
    "https://example.amazonaws.com/?a=1&a=2",
    "fa3a6381870a5302796b5025765861497c5c928c6d15ae3e04751034cd035815";
    "repeated key keeps every value"
)]
#[test_case(
    "https://example.amazonaws.com/?a=2",
    "2b5fc325dddd38fafb8d3e141bc4a816079f6f76115025467efb8e7dc2b49a94";
    "single value"
)]
#[tokio::test]
async fn test_get_repeated_query_key(uri: &str, signature: &str) -> Result<()> {
    let signer = init_signer(identity());

    let (mut parts, body) = Request::get(uri).body(bytes::Bytes::new())?.into_parts();
    signer.sign_at(&mut parts, body, suite_time()).await?;

    assert_eq!(
        parts.headers[AUTHORIZATION],
        authorization("host;x-amz-date", signature).as_str()
    );
    Ok(())
}

#[tokio::test]
async fn test_resign_same_request() -> Result<()> {
    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::new(super::ACCESS_KEY_ID, super::SECRET_ACCESS_KEY)
            .with_session_token("session-token"),
        RequestSigner::new(identity()),
    );

    let (mut parts, body) = Request::get("https://example.amazonaws.com/")
        .body(bytes::Bytes::new())?
        .into_parts();
    signer.sign_at(&mut parts, body.clone(), suite_time()).await?;
    let first = parts.headers.clone();
    signer.sign_at(&mut parts, body, suite_time()).await?;

    assert_eq!(parts.headers, first);
    assert_eq!(
        parts.headers[AUTHORIZATION],
        authorization(
            "host;x-amz-date",
            "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        )
        .as_str()
    );
    Ok(())
}

#[tokio::test]
async fn test_post_x_www_form_urlencoded() -> Result<()> {
    let signer = init_signer(identity());

    let (mut parts, body) = Request::post("https://example.amazonaws.com/")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(bytes::Bytes::from_static(b"Param1=value1"))?
        .into_parts();
    signer.sign_at(&mut parts, body, suite_time()).await?;

    assert_eq!(
        parts.headers[AUTHORIZATION],
        authorization(
            "content-type;host;x-amz-date",
            "ff11897932ad3f4e8b18135d722051e5ac45fc38421b1da7b9d196a0fe09473a"
        )
        .as_str()
    );
    Ok(())
}

#[tokio::test]
async fn test_session_token_is_attached_but_not_signed() -> Result<()> {
    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::new(super::ACCESS_KEY_ID, super::SECRET_ACCESS_KEY)
            .with_session_token("session-token"),
        RequestSigner::new(identity()),
    );

    let (mut parts, body) = Request::get("https://example.amazonaws.com/")
        .body(bytes::Bytes::new())?
        .into_parts();
    signer.sign_at(&mut parts, body, suite_time()).await?;

    assert_eq!(parts.headers["x-amz-security-token"], "session-token");
    assert_eq!(
        parts.headers[AUTHORIZATION],
        authorization(
            "host;x-amz-date",
            "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        )
        .as_str()
    );
    Ok(())
}

#[tokio::test]
async fn test_dynamodb_list_tables() -> Result<()> {
    let identity = ServiceIdentity::new("dynamodb.us-west-2.amazonaws.com", "dynamodb", "us-west-2")?
        .with_profile(&ServiceProfile::dynamodb());
    let signer = init_signer(identity);

    let (mut parts, body) = Request::builder()
        .method(Method::POST)
        .uri("https://dynamodb.us-west-2.amazonaws.com/")
        .header("X-Amz-Target", "DynamoDB_20120810.ListTables")
        .body(bytes::Bytes::from_static(b"{}"))?
        .into_parts();
    signer.sign_at(&mut parts, body, suite_time()).await?;

    assert_eq!(
        parts.headers[AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-west-2/dynamodb/aws4_request, \
         SignedHeaders=content-type;host;x-amz-date;x-amz-target, \
         Signature=505d14a695fff190a2cde7cb36709ee2a2b66b87559898118b7c113e33d3c2cc"
    );
    Ok(())
}

#[tokio::test]
async fn test_signing_is_deterministic() -> Result<()> {
    let signer = init_signer(identity());

    let mut signed = Vec::new();
    for _ in 0..2 {
        let (mut parts, body) = Request::put("https://example.amazonaws.com/hello%20world.txt")
            .header("x-amz-meta-owner", "awssign")
            .body(bytes::Bytes::from_static(b"Hello, World!"))?
            .into_parts();
        signer.sign_at(&mut parts, body, suite_time()).await?;
        signed.push(parts.headers);
    }

    assert_eq!(signed[0], signed[1]);
    Ok(())
}
