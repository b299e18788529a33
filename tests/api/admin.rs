use anyhow::Result;
use chrono::{Duration, Utc};
use newsletter::{subscription::SubscriberStore, web::types::ValidEmail};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::{spawn_app, spawn_app_with_failing_store, ADMIN_PASSWORD, ADMIN_USERNAME};

#[tokio::test]
async fn admin_subscribers_requires_credentials() -> Result<()> {
    let app = spawn_app().await?;

    let tests = [
        (None, "no credentials"),
        (Some((ADMIN_USERNAME, "wrong-password")), "wrong password"),
        (Some(("root", ADMIN_PASSWORD)), "wrong username"),
    ];

    for (credentials, description) in tests {
        let res = app.get_admin_subscribers(credentials).await?;

        assert_eq!(
            res.status(),
            StatusCode::UNAUTHORIZED,
            "admin listing was not rejected with: {description}"
        );
        assert!(res
            .headers()
            .get(reqwest::header::WWW_AUTHENTICATE)
            .is_some());
        let body: Value = res.json().await?;
        assert_eq!(body, json!({ "error": "Unauthorized" }));
    }

    Ok(())
}

#[tokio::test]
async fn admin_subscribers_lists_active_newest_first() -> Result<()> {
    let app = spawn_app().await?;
    let now = Utc::now();

    app.dm
        .insert_if_absent(&ValidEmail::parse("a@example.com")?, now - Duration::hours(2))
        .await?;
    app.dm
        .insert_if_absent(&ValidEmail::parse("b@example.com")?, now - Duration::hours(1))
        .await?;
    app.dm
        .insert_if_absent(&ValidEmail::parse("gone@example.com")?, now)
        .await?;
    sqlx::query("UPDATE subscribers SET is_active = 0 WHERE email = ?")
        .bind("gone@example.com")
        .execute(app.dm.db())
        .await?;

    let res = app
        .get_admin_subscribers(Some((ADMIN_USERNAME, ADMIN_PASSWORD)))
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Vec<Value> = res.json().await?;
    let emails: Vec<&str> = body
        .iter()
        .filter_map(|row| row["email"].as_str())
        .collect();
    assert_eq!(emails, ["b@example.com", "a@example.com"]);
    assert!(body.iter().all(|row| row["subscription_date"].is_string()));

    Ok(())
}

#[tokio::test]
async fn admin_subscribers_empty_list() -> Result<()> {
    let app = spawn_app().await?;

    let res = app
        .get_admin_subscribers(Some((ADMIN_USERNAME, ADMIN_PASSWORD)))
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!([]));

    Ok(())
}

#[tokio::test]
async fn admin_subscribers_storage_failure() -> Result<()> {
    let app = spawn_app_with_failing_store().await?;

    let res = app
        .get_admin_subscribers(Some((ADMIN_USERNAME, ADMIN_PASSWORD)))
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "error": "Database error" }));

    Ok(())
}
