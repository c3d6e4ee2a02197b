use super::{init_signer, suite_time};
use anyhow::Result;
use awssign_core::{ErrorKind, RequestDescription};
use awssign_v4::{ApiGatewayEndpoint, Config, RequestPreparer, ResolveEndpoint};
use http::header::AUTHORIZATION;
use http::Method;
use log::debug;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_prepare_api_gateway() -> Result<()> {
    let endpoint =
        ApiGatewayEndpoint.resolve("https://a1b2c3.execute-api.us-east-1.amazonaws.com/prod")?;
    let signer = init_signer(endpoint.identity().clone());
    let preparer = RequestPreparer::from_endpoint(endpoint, signer).with_defaults(json!({
        "headers": {"accept": "application/json"},
        "timeout": 10,
    }))?;

    let req = RequestDescription::new(Method::GET, "items").with_query("limit", "10");
    let prepared = preparer.prepare_at(req, suite_time()).await?;
    debug!("prepared: {prepared:?}");

    let req = prepared.request;
    assert_eq!(
        req.uri().to_string(),
        "https://a1b2c3.execute-api.us-east-1.amazonaws.com/prod/items?limit=10"
    );
    assert_eq!(req.headers()["accept"], "application/json");
    assert_eq!(
        req.headers()[AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/execute-api/aws4_request, \
         SignedHeaders=accept;host;x-amz-date, \
         Signature=01cad8e61d6f800efc808d81da94bee4bac6062958b7efe61ca1ba74a2a601f2"
    );
    assert_eq!(prepared.options.get("timeout"), Some(&json!(10)));
    Ok(())
}

#[tokio::test]
async fn test_prepare_from_config() -> Result<()> {
    let cfg = Config {
        endpoint: Some("https://service.us-east-1.amazonaws.com".to_string()),
        access_key_id: Some(super::ACCESS_KEY_ID.to_string()),
        secret_access_key: Some(super::SECRET_ACCESS_KEY.to_string()),
        ..Default::default()
    };
    let preparer = RequestPreparer::new(cfg.service_identity()?, cfg.signer(Default::default())?);

    let prepared = preparer
        .prepare_at(RequestDescription::new(Method::GET, "/"), suite_time())
        .await?;

    assert_eq!(
        prepared.request.headers()[AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
         SignedHeaders=host;x-amz-date, \
         Signature=59fd7e45981bbad28d237d44b6fe14eed75ba30e924ffb7ab805db98975202d3"
    );
    Ok(())
}

#[tokio::test]
async fn test_prepare_without_credential() -> Result<()> {
    let cfg = Config {
        service: Some("service".to_string()),
        region: Some("us-east-1".to_string()),
        ..Default::default()
    };
    let preparer = RequestPreparer::new(cfg.service_identity()?, cfg.signer(Default::default())?);

    let err = preparer
        .prepare_at(RequestDescription::new(Method::GET, "/"), suite_time())
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialsRequired);
    Ok(())
}
