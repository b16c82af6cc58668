mod common;

use axum::body::to_bytes;
use axum::http::{StatusCode, header};
use common::{TestEnv, body_json, cookie_pair, empty_request, json_request, login, send};
use folio_backend::StatsAggregator;

#[tokio::test]
async fn contact_submission_is_stored_unread_and_counted() {
    let env = TestEnv::new("contact").await;
    let app = env.app();
    let stats = StatsAggregator::new(env.store.clone());
    let before = stats.read().await.total_contacts;

    let body = r#"{"name":"Ada","email":"ada@example.com","message":"hi"}"#;
    let mut req = json_request("POST", "/api/contact", body, None);
    req.headers_mut()
        .insert("x-forwarded-for", "203.0.113.5".parse().unwrap());
    req.headers_mut()
        .insert(header::USER_AGENT, "integration-test".parse().unwrap());
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["id"].as_i64().unwrap();

    assert_eq!(stats.read().await.total_contacts, before + 1);

    let recent = env.store.recent_contacts(10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, id);
    assert_eq!(recent[0].status.as_str(), "unread");

    let stored = env.store.get_contact(id).await.unwrap().unwrap();
    assert_eq!(stored.ip_address.as_deref(), Some("203.0.113.5"));
    assert_eq!(stored.user_agent.as_deref(), Some("integration-test"));
}

#[tokio::test]
async fn invalid_contact_is_rejected_without_side_effects() {
    let env = TestEnv::new("contact-invalid").await;
    let app = env.app();

    for body in [
        r#"{"name":"Ada","email":"not-an-email","message":"hi"}"#,
        r#"{"name":"","email":"ada@example.com","message":"hi"}"#,
        r#"{"email":"ada@example.com","message":"hi"}"#,
    ] {
        let resp = send(&app, json_request("POST", "/api/contact", body, None)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
    }

    assert_eq!(env.store.count_contacts().await.unwrap(), 0);
    let stats = StatsAggregator::new(env.store.clone()).read().await;
    assert_eq!(stats.total_contacts, 0);
}

#[tokio::test]
async fn resume_download_is_served_and_logged() {
    let env = TestEnv::new("resume").await;
    let app = env.app();

    let resp = send(&app, empty_request("GET", "/api/download/resume", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(env.store.count_downloads().await.unwrap(), 0);

    env.write_asset("resume.pdf", b"%PDF-1.4 fake");
    let resp = send(&app, empty_request("GET", "/api/download/resume", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 fake");

    assert_eq!(env.store.count_downloads().await.unwrap(), 1);
    let stats = StatsAggregator::new(env.store.clone()).read().await;
    assert_eq!(stats.total_downloads, 1);

    let cookie = login(&app).await;
    let resp = send(&app, empty_request("GET", "/api/admin/stats", Some(&cookie))).await;
    let json = body_json(resp).await;
    assert_eq!(json["data"]["totalDownloads"], 1);
    assert_eq!(json["data"]["downloadsByDate"][0]["count"], 1);
}

#[tokio::test]
async fn page_views_count_unique_visitors_once() {
    let env = TestEnv::new("pageview").await;
    let app = env.app();

    let first = send(&app, empty_request("POST", "/api/track/pageview", None)).await;
    assert_eq!(first.status(), StatusCode::OK);
    let visitor = cookie_pair(&first, "visitor").expect("visitor cookie missing");

    for _ in 0..2 {
        let resp = send(&app, empty_request("POST", "/api/track/pageview", Some(&visitor))).await;
        assert!(cookie_pair(&resp, "visitor").is_none());
    }

    let stats = StatsAggregator::new(env.store.clone()).read().await;
    assert_eq!(stats.page_views, 3);
    assert_eq!(stats.unique_visitors, 1);
}

#[tokio::test]
async fn health_reports_connected_store() {
    let env = TestEnv::new("health").await;
    let resp = send(&env.app(), empty_request("GET", "/api/health", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "connected");
    assert_eq!(json["table_count"], 4);
}

#[tokio::test]
async fn admin_page_redirects_until_logged_in() {
    let env = TestEnv::new("pages").await;
    env.write_asset("admin.html", b"<h1>dashboard</h1>");
    env.write_asset("login.html", b"<h1>login</h1>");
    env.write_asset("index.html", b"<h1>home</h1>");
    let app = env.app();

    let resp = send(&app, empty_request("GET", "/admin", None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/admin-login");

    let resp = send(&app, empty_request("GET", "/admin-login", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = login(&app).await;
    let resp = send(&app, empty_request("GET", "/admin", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"<h1>dashboard</h1>");

    let resp = send(&app, empty_request("GET", "/", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"<h1>home</h1>");
}
