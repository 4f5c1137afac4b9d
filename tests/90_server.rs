mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client()
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    // OK with a database, SERVICE_UNAVAILABLE without one
    assert!(
        res.status() == StatusCode::OK || res.status() == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    assert!(body["data"]["status"].is_string());
    Ok(())
}

#[tokio::test]
async fn root_returns_service_info_on_local_host() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client().get(format!("{}/", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["root_domain"], "localhost");
    Ok(())
}

#[tokio::test]
async fn www_tenant_host_is_redirected() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client()
        .get(format!("{}/menu?branch=1", server.base_url))
        .header(header::HOST, server.tenant_host("www.thecircle"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    let location = res.headers()[header::LOCATION].to_str()?;
    assert_eq!(location, format!("http://thecircle.localhost:{}/menu?branch=1", server.port));
    Ok(())
}

#[tokio::test]
async fn admin_api_requires_token() -> Result<()> {
    let server = common::ensure_server().await?;

    // /api/ is always public, so a tenant host reaches the admin router untouched
    let res = common::client()
        .get(format!("{}/api/admin/tenants", server.base_url))
        .header(header::HOST, server.tenant_host("thecircle"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}
