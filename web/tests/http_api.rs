//! HTTP API tests against the in-memory providers.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use linkboard_auth::{SessionConfig, SessionSigner};
use linkboard_core::services::{accounts, catalog};
use linkboard_core::{Account, Category};
use linkboard_testing::{fixtures, test_clock, InMemoryMedia, InMemoryStore, PlainTextHasher};
use linkboard_web::router::router;
use linkboard_web::AppState;
use serde_json::{json, Value};
use std::sync::Arc;

struct Harness {
    server: TestServer,
    store: InMemoryStore,
    media: InMemoryMedia,
    signer: Arc<SessionSigner>,
}

impl Harness {
    fn new() -> Self {
        linkboard_testing::init_tracing();
        let store = InMemoryStore::new();
        let media = InMemoryMedia::new();
        let signer = Arc::new(
            SessionSigner::new(SessionConfig::new(vec![42; 32]), Arc::new(test_clock())).expect("signer"),
        );
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(media.clone()),
            Arc::new(PlainTextHasher),
            Arc::clone(&signer),
        );
        let server = TestServer::new(router(state)).expect("test server");
        Self {
            server,
            store,
            media,
            signer,
        }
    }

    async fn admin(&self, username: &str) -> Account {
        accounts::create_admin(&self.store, &PlainTextHasher, &fixtures::registration(username, username))
            .await
            .expect("admin")
    }

    async fn member(&self, username: &str) -> Account {
        accounts::register_member(&self.store, &PlainTextHasher, &fixtures::registration(username, username))
            .await
            .expect("member")
    }

    fn cookie(&self, account: &Account) -> (HeaderName, HeaderValue) {
        let token = self.signer.issue(account).expect("token");
        (
            header::COOKIE,
            HeaderValue::from_str(&format!("linkboard_session={token}")).expect("cookie"),
        )
    }

    async fn categories(&self, codes: &[&str]) -> Vec<Category> {
        let mut created = Vec::new();
        for code in codes {
            created.push(
                catalog::create_category(&self.store, &fixtures::category_draft(code))
                    .await
                    .expect("category"),
            );
        }
        created
    }

    async fn category_codes(&self) -> Vec<String> {
        catalog::list_categories(&self.store)
            .await
            .expect("list")
            .into_iter()
            .map(|c| c.code)
            .collect()
    }
}

// ============================================================================
// Probes
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let h = Harness::new();

    h.server.get("/health").await.assert_status_ok();
    h.server.get("/ready").await.assert_status_ok();

    h.store.fail_writes(true);
    let response = h.server.get("/ready").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>()["ready"], json!(false));
}

#[tokio::test]
async fn test_correlation_id_is_echoed() {
    let h = Harness::new();
    let response = h.server.get("/health").await;
    let id = response.header("x-correlation-id");
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
}

// ============================================================================
// Reorder authorization
// ============================================================================

#[tokio::test]
async fn test_reorder_without_session_is_rejected_before_any_write() {
    let h = Harness::new();
    let categories = h.categories(&["a", "b"]).await;
    let writes = h.store.write_count();

    let response = h
        .server
        .put(&format!("/api/admin/text-banner-categories/{}/reorder", categories[1].id))
        .json(&json!({"direction": "up"}))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["code"], "UNAUTHORIZED");
    assert_eq!(h.store.write_count(), writes);
    assert_eq!(h.category_codes().await, vec!["a", "b"]);
}

#[tokio::test]
async fn test_reorder_by_member_is_forbidden() {
    let h = Harness::new();
    let categories = h.categories(&["a", "b"]).await;
    let member = h.member("reader").await;
    let (name, value) = h.cookie(&member);
    let writes = h.store.write_count();

    let response = h
        .server
        .put(&format!("/api/admin/text-banner-categories/{}/reorder", categories[1].id))
        .add_header(name, value)
        .json(&json!({"direction": "up"}))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(h.store.write_count(), writes);
}

#[tokio::test]
async fn test_text_banner_reorder_by_member_is_forbidden() {
    let h = Harness::new();
    let category = h.categories(&["shops"]).await.remove(0);
    let mut banners = Vec::new();
    for name in ["first", "second"] {
        let banner = catalog::create_text_banner(&h.store, &fixtures::text_banner_draft(category.id, name))
            .await
            .expect("banner");
        banners.push(banner);
    }
    let member = h.member("reader").await;
    let (name, value) = h.cookie(&member);
    let writes = h.store.write_count();

    let response = h
        .server
        .put(&format!("/api/admin/text-banners/{}/reorder", banners[1].id))
        .add_header(name, value)
        .json(&json!({"direction": "up"}))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["code"], "FORBIDDEN");
    assert_eq!(h.store.write_count(), writes);

    let names: Vec<String> = catalog::list_text_banners(&h.store, Some(category.id))
        .await
        .expect("list")
        .into_iter()
        .map(|banner| banner.name)
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[tokio::test]
async fn test_tampered_cookie_is_unauthorized() {
    let h = Harness::new();
    let response = h
        .server
        .get("/api/admin/text-banner-categories")
        .add_header(header::COOKIE, HeaderValue::from_static("linkboard_session=forged.token"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Category reorder
// ============================================================================

#[tokio::test]
async fn test_category_moves_up_and_down() {
    let h = Harness::new();
    let categories = h.categories(&["a", "b", "c"]).await;
    let admin = h.admin("root").await;
    let (name, value) = h.cookie(&admin);

    let response = h
        .server
        .put(&format!("/api/admin/text-banner-categories/{}/reorder", categories[1].id))
        .add_header(name.clone(), value.clone())
        .json(&json!({"direction": "up"}))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({"ok": true, "moved": true}));
    assert_eq!(h.category_codes().await, vec!["b", "a", "c"]);

    h.server
        .put(&format!("/api/admin/text-banner-categories/{}/reorder", categories[1].id))
        .add_header(name, value)
        .json(&json!({"direction": "down"}))
        .await
        .assert_status_ok();
    assert_eq!(h.category_codes().await, vec!["a", "b", "c"]);
    assert!(h.store.category_scope().expect("scope").is_contiguous());
}

#[tokio::test]
async fn test_boundary_move_succeeds_without_writing() {
    let h = Harness::new();
    let categories = h.categories(&["a", "b"]).await;
    let admin = h.admin("root").await;
    let (name, value) = h.cookie(&admin);
    let writes = h.store.write_count();

    let first_up = h
        .server
        .put(&format!("/api/admin/text-banner-categories/{}/reorder", categories[0].id))
        .add_header(name.clone(), value.clone())
        .json(&json!({"direction": "up"}))
        .await;
    first_up.assert_status_ok();
    first_up.assert_json(&json!({"ok": true, "moved": false}));

    h.server
        .put(&format!("/api/admin/text-banner-categories/{}/reorder", categories[1].id))
        .add_header(name, value)
        .json(&json!({"direction": "down"}))
        .await
        .assert_json(&json!({"ok": true, "moved": false}));

    assert_eq!(h.store.write_count(), writes);
    assert_eq!(h.category_codes().await, vec!["a", "b"]);
}

#[tokio::test]
async fn test_reorder_unknown_category_is_not_found() {
    let h = Harness::new();
    h.categories(&["a"]).await;
    let admin = h.admin("root").await;
    let (name, value) = h.cookie(&admin);

    let response = h
        .server
        .put("/api/admin/text-banner-categories/4242/reorder")
        .add_header(name, value)
        .json(&json!({"direction": "down"}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_reorder_rejects_unknown_direction() {
    let h = Harness::new();
    let categories = h.categories(&["a", "b"]).await;
    let admin = h.admin("root").await;
    let (name, value) = h.cookie(&admin);

    let response = h
        .server
        .put(&format!("/api/admin/text-banner-categories/{}/reorder", categories[1].id))
        .add_header(name, value)
        .json(&json!({"direction": "sideways"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_storage_failure_is_internal_error_without_detail() {
    let h = Harness::new();
    let categories = h.categories(&["a", "b"]).await;
    let admin = h.admin("root").await;
    let (name, value) = h.cookie(&admin);
    h.store.fail_writes(true);

    let response = h
        .server
        .put(&format!("/api/admin/text-banner-categories/{}/reorder", categories[1].id))
        .add_header(name, value)
        .json(&json!({"direction": "up"}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["message"], "An internal error occurred");
    h.store.fail_writes(false);
    assert_eq!(h.category_codes().await, vec!["a", "b"]);
}

// ============================================================================
// Categories and text banners
// ============================================================================

#[tokio::test]
async fn test_category_crud() {
    let h = Harness::new();
    let admin = h.admin("root").await;
    let (name, value) = h.cookie(&admin);

    let created = h
        .server
        .post("/api/admin/text-banner-categories")
        .add_header(name.clone(), value.clone())
        .json(&json!({"code": "news", "name": "News"}))
        .await;
    created.assert_status(StatusCode::CREATED);
    let id = created.json::<Value>()["id"].as_i64().unwrap();
    assert_eq!(created.json::<Value>()["sort_order"], 0);

    let duplicate = h
        .server
        .post("/api/admin/text-banner-categories")
        .add_header(name.clone(), value.clone())
        .json(&json!({"code": "news", "name": "Other"}))
        .await;
    duplicate.assert_status(StatusCode::CONFLICT);

    let invalid = h
        .server
        .post("/api/admin/text-banner-categories")
        .add_header(name.clone(), value.clone())
        .json(&json!({"code": "News!", "name": "x"}))
        .await;
    invalid.assert_status(StatusCode::BAD_REQUEST);

    h.server
        .put(&format!("/api/admin/text-banner-categories/{id}"))
        .add_header(name.clone(), value.clone())
        .json(&json!({"code": "news", "name": "Headlines"}))
        .await
        .assert_status_ok();

    h.server
        .delete(&format!("/api/admin/text-banner-categories/{id}"))
        .add_header(name.clone(), value.clone())
        .await
        .assert_json(&json!({"ok": true}));

    h.server
        .delete(&format!("/api/admin/text-banner-categories/{id}"))
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_text_banner_capacity_and_reorder() {
    let h = Harness::new();
    let category = h.categories(&["links"]).await.remove(0);
    let admin = h.admin("root").await;
    let (name, value) = h.cookie(&admin);

    let mut ids = Vec::new();
    for n in 0..10 {
        let response = h
            .server
            .post("/api/admin/text-banners")
            .add_header(name.clone(), value.clone())
            .json(&json!({"category_id": category.id, "name": format!("site{n}"), "link": "https://x.example"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        ids.push(response.json::<Value>()["id"].as_i64().unwrap());
    }

    h.server
        .post("/api/admin/text-banners")
        .add_header(name.clone(), value.clone())
        .json(&json!({"category_id": category.id, "name": "eleventh", "link": "https://x.example"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    h.server
        .post("/api/admin/text-banners")
        .add_header(name.clone(), value.clone())
        .json(&json!({"category_id": 777, "name": "lost", "link": "https://x.example"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    h.server
        .put(&format!("/api/admin/text-banners/{}/reorder", ids[9]))
        .add_header(name.clone(), value.clone())
        .json(&json!({"direction": "up"}))
        .await
        .assert_json(&json!({"ok": true, "moved": true}));

    let listed = h
        .server
        .get("/api/admin/text-banners")
        .add_query_param("categoryId", category.id.0)
        .add_header(name, value)
        .await
        .json::<Vec<Value>>();
    let order: Vec<i64> = listed.iter().map(|b| b["id"].as_i64().unwrap()).collect();
    assert_eq!(order[8], ids[9]);
    assert_eq!(order[9], ids[8]);
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_register_login_session_logout() {
    let h = Harness::new();

    h.server
        .post("/api/auth/register")
        .json(&json!({"username": "kim", "nickname": "Kim", "password": "password123"}))
        .await
        .assert_status(StatusCode::CREATED);

    h.server
        .get("/api/auth/check-username")
        .add_query_param("username", "kim")
        .await
        .assert_json(&json!({"taken": true}));
    h.server
        .get("/api/auth/check-username")
        .add_query_param("nickname", "Lee")
        .await
        .assert_json(&json!({"taken": false}));

    let login = h
        .server
        .post("/api/auth/login")
        .json(&json!({"username": "kim", "password": "password123"}))
        .await;
    login.assert_status_ok();
    let set_cookie = login.header(header::SET_COOKIE).to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("linkboard_session="));
    assert!(set_cookie.contains("HttpOnly"));

    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let session = h
        .server
        .get("/api/auth/session")
        .add_header(header::COOKIE, HeaderValue::from_str(&cookie).unwrap())
        .await;
    session.assert_status_ok();
    assert_eq!(session.json::<Value>()["nickname"], "Kim");
    assert_eq!(session.json::<Value>()["role"], "member");

    let logout = h.server.post("/api/auth/logout").await;
    assert!(logout.header(header::SET_COOKIE).to_str().unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_login_failures() {
    let h = Harness::new();
    let member = h.member("kim").await;

    h.server
        .post("/api/auth/login")
        .json(&json!({"username": "kim", "password": "wrong-password"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    h.store.set_account_active(member.id, false);
    h.server
        .post("/api/auth/login")
        .json(&json!({"username": "kim", "password": "password123"}))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_nickname_names_the_field() {
    let h = Harness::new();
    h.member("kim").await;

    let response = h
        .server
        .post("/api/auth/register")
        .json(&json!({"username": "other", "nickname": "kim", "password": "password123"}))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["field"], "nickname");

    h.server
        .post("/api/auth/register")
        .json(&json!({"username": "short", "nickname": "Short", "password": "1234"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_management_rules() {
    let h = Harness::new();
    let root = h.admin("root").await;
    let (name, value) = h.cookie(&root);

    h.server
        .delete(&format!("/api/admin/admins/{}", root.id))
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let created = h
        .server
        .post("/api/admin/admins")
        .add_header(name.clone(), value.clone())
        .json(&json!({"username": "second", "nickname": "Second", "password": "password123"}))
        .await;
    created.assert_status(StatusCode::CREATED);
    let second = created.json::<Value>()["id"].as_i64().unwrap();

    h.server
        .patch(&format!("/api/admin/admins/{second}"))
        .add_header(name.clone(), value.clone())
        .json(&json!({"nickname": "root"}))
        .await
        .assert_status(StatusCode::CONFLICT);

    h.server
        .delete(&format!("/api/admin/admins/{second}"))
        .add_header(name.clone(), value.clone())
        .await
        .assert_json(&json!({"ok": true}));

    let admins = h
        .server
        .get("/api/admin/admins")
        .add_header(name, value)
        .await
        .json::<Vec<Value>>();
    assert_eq!(admins.len(), 1);
    assert!(admins[0].get("password_hash").is_none());
}

// ============================================================================
// Images and public pages
// ============================================================================

fn banner_form(name: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name)
        .add_text("link", "https://shop.example")
        .add_part(
            "file",
            Part::bytes(fixtures::png_upload("ad.PNG").bytes)
                .file_name("ad.PNG")
                .mime_type("image/png"),
        )
}

#[tokio::test]
async fn test_common_banner_lifecycle_and_links_page() {
    let h = Harness::new();
    let admin = h.admin("root").await;
    let (name, value) = h.cookie(&admin);
    let category = h.categories(&["shops"]).await.remove(0);
    catalog::create_text_banner(&h.store, &fixtures::text_banner_draft(category.id, "first"))
        .await
        .expect("banner");

    let created = h
        .server
        .post("/api/admin/common-banners")
        .add_header(name.clone(), value.clone())
        .multipart(banner_form("ad"))
        .await;
    created.assert_status(StatusCode::CREATED);
    let body = created.json::<Value>();
    let path = body["image_path"].as_str().unwrap().to_string();
    assert!(path.starts_with("common-banners/") && path.ends_with(".png"));
    assert_eq!(body["image_url"], format!("/media/{path}"));
    assert!(h.media.contains(&path));

    let links = h.server.get("/api/links").await.json::<Value>();
    assert_eq!(links["categories"][0]["code"], "shops");
    assert_eq!(links["categories"][0]["banners"][0]["name"], "first");
    assert_eq!(links["banners"].as_array().unwrap().len(), 1);

    // The other family does not see it.
    let guarantee = h.server.get("/api/guarantee").await.json::<Vec<Value>>();
    assert!(guarantee.is_empty());

    let id = body["id"].as_i64().unwrap();
    h.server
        .delete(&format!("/api/admin/image-banners/{id}"))
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    h.server
        .delete(&format!("/api/admin/common-banners/{id}"))
        .add_header(name, value)
        .await
        .assert_json(&json!({"ok": true}));
    assert!(!h.media.contains(&path));
}

#[tokio::test]
async fn test_banner_upload_requires_file() {
    let h = Harness::new();
    let admin = h.admin("root").await;
    let (name, value) = h.cookie(&admin);

    let form = MultipartForm::new().add_text("name", "ad").add_text("link", "https://x.example");
    h.server
        .post("/api/admin/image-banners")
        .add_header(name, value)
        .multipart(form)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert!(h.media.paths().is_empty());
}

#[tokio::test]
async fn test_profile_update_reissues_session() {
    let h = Harness::new();
    let member = h.member("kim").await;
    let (name, value) = h.cookie(&member);

    let form = MultipartForm::new().add_text("nickname", "Kimmy").add_part(
        "image",
        Part::bytes(vec![1, 2, 3]).file_name("me.JPG").mime_type("image/jpeg"),
    );
    let response = h
        .server
        .post("/api/profile/update")
        .add_header(name.clone(), value.clone())
        .multipart(form)
        .await;
    response.assert_status_ok();

    let expected_path = format!("avatars/{}/profile.jpg", member.id);
    response.assert_json(&json!({
        "nickname": "Kimmy",
        "imagePath": expected_path,
        "imageUrl": format!("/media/{expected_path}"),
    }));
    assert!(h.media.contains(&expected_path));

    let set_cookie = response.header(header::SET_COOKIE).to_str().unwrap().to_string();
    let token = set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("linkboard_session="))
        .unwrap();
    assert_eq!(h.signer.verify(token).unwrap().nickname, "Kimmy");

    h.server
        .post("/api/profile/delete-image")
        .add_header(name.clone(), value.clone())
        .await
        .assert_json(&json!({"ok": true}));
    assert!(!h.media.contains(&expected_path));

    h.server
        .post("/api/profile/delete-image")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_requires_session() {
    let h = Harness::new();
    h.server
        .post("/api/profile/delete-image")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(h.store.write_count(), 0);
}
