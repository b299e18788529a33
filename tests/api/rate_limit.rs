use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::{spawn_app, spawn_app_with_rate_limit, spawn_app_without_connect_info};

#[tokio::test]
async fn eleventh_subscribe_attempt_is_rejected() -> Result<()> {
    let app = spawn_app().await?;

    for i in 0..10 {
        let res = app
            .post_subscriptions(&json!({ "email": format!("reader{i}@example.com") }))
            .await?;
        assert_eq!(res.status(), StatusCode::OK, "request {i} was not admitted");
        assert_eq!(res.headers()["x-ratelimit-limit"], "10");
        assert_eq!(
            res.headers()["x-ratelimit-remaining"],
            (9 - i).to_string().as_str()
        );
    }

    let res = app
        .post_subscriptions(&json!({ "email": "reader10@example.com" }))
        .await?;

    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = res.headers()[reqwest::header::RETRY_AFTER]
        .to_str()?
        .parse()?;
    assert!(retry_after > 0 && retry_after <= 900);
    let body: Value = res.json().await?;
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "Too many subscription attempts, please try again later."
        })
    );
    assert_eq!(app.count_subscribers("reader10@example.com").await?, 0);

    Ok(())
}

#[tokio::test]
async fn failed_validations_count_towards_the_limit() -> Result<()> {
    let app = spawn_app_with_rate_limit(2).await?;

    for _ in 0..2 {
        let res = app.post_subscriptions(&json!({})).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
    let res = app
        .post_subscriptions(&json!({ "email": "late@example.com" }))
        .await?;

    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    Ok(())
}

#[tokio::test]
async fn other_routes_are_not_limited() -> Result<()> {
    let app = spawn_app_with_rate_limit(1).await?;

    app.post_subscriptions(&json!({ "email": "first@example.com" }))
        .await?;
    let res = app
        .post_subscriptions(&json!({ "email": "second@example.com" }))
        .await?;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    let res = app.get_health().await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn unknown_newsletter_paths_count_towards_the_limit() -> Result<()> {
    let app = spawn_app_with_rate_limit(2).await?;

    for _ in 0..2 {
        let res = app
            .http_client
            .post(app.url("/api/newsletter/unknown"))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().contains_key("x-ratelimit-remaining"));
    }

    let res = app
        .http_client
        .post(app.url("/api/newsletter/unknown"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    let res = app
        .post_subscriptions(&json!({ "email": "after-unknown@example.com" }))
        .await?;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(app.count_subscribers("after-unknown@example.com").await?, 0);

    Ok(())
}

#[tokio::test]
async fn requests_without_peer_address_share_one_quota() -> Result<()> {
    let app = spawn_app_without_connect_info(1).await?;

    let res = app
        .post_subscriptions(&json!({ "email": "first@example.com" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let other_client = reqwest::Client::new();
    let res = other_client
        .post(app.url("/api/newsletter/subscribe"))
        .json(&json!({ "email": "second@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    Ok(())
}
