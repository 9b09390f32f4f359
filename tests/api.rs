//! End-to-end tests driving the full router against an in-memory database.

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;

use easyevents::catalog::ImageLibrary;
use easyevents::config::Config;
use easyevents::{api, db, AppState};

struct TestApp {
    router: Router,
    state: Arc<AppState>,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
    text: String,
}

impl TestResponse {
    /// `name=value` of a Set-Cookie header, ready to send back
    fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{}=", name)))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

async fn test_app_with(config: Config) -> TestApp {
    let pool = db::init_in_memory().await.unwrap();
    let images = ImageLibrary::default();
    db::seeders::seed_catalog(&pool, &images).await.unwrap();

    let state = Arc::new(AppState::new(config, pool, images));
    TestApp {
        router: api::create_router(state.clone()),
        state,
    }
}

async fn test_app() -> TestApp {
    let mut config = Config::default();
    config.auth.expose_reset_tokens = true;
    test_app_with(config).await
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.call(Method::GET, uri, token, None, None).await
    }

    async fn register(&self, email: &str) -> TestResponse {
        self.call(
            Method::POST,
            "/api/register",
            None,
            None,
            Some(json!({
                "firstName": "דנה",
                "lastName": "כהן",
                "email": email,
                "phone": "050-1234567",
                "password": "secret123"
            })),
        )
        .await
    }

    async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.call(
            Method::POST,
            "/api/login",
            None,
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Register and log in, returning the bearer token
    async fn user(&self, email: &str) -> String {
        assert_eq!(self.register(email).await.status, StatusCode::CREATED);
        let response = self.login(email, "secret123").await;
        assert_eq!(response.status, StatusCode::OK);
        response.body["token"].as_str().unwrap().to_string()
    }

    async fn first_id(&self, table: &str) -> String {
        let (id,): (String,) = sqlx::query_as(&format!("SELECT id FROM {} ORDER BY rowid LIMIT 1", table))
            .fetch_one(&self.state.db)
            .await
            .unwrap();
        id
    }

    async fn create_event(&self, token: &str) -> Value {
        let response = self
            .call(
                Method::POST,
                "/api/events",
                Some(token),
                None,
                Some(json!({ "name": "החתונה", "event_type": "wedding", "vendors": [] })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body
    }
}

fn ids(list: &Value) -> HashSet<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;
    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text, "OK");
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = test_app().await;

    let first = app.register("dana@example.com").await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["success"], true);
    assert_eq!(first.body["user"]["firstName"], "דנה");
    assert!(first.body["user"].get("password_hash").is_none());

    let second = app.register("  DANA@example.com ").await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["success"], false);
    assert_eq!(second.body["code"], "conflict");
    assert_eq!(second.body["redirect"], "/login");
}

#[tokio::test]
async fn test_registration_validation() {
    let app = test_app().await;
    let response = app
        .call(
            Method::POST,
            "/api/register",
            None,
            None,
            Some(json!({
                "firstName": "דנה",
                "lastName": "כהן",
                "email": "not-an-email",
                "password": "short"
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "validation_error");
    assert!(response.body["details"]["email"].is_array());
    assert!(response.body["details"]["password"].is_array());
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_user() {
    let app = test_app().await;
    app.register("dana@example.com").await;

    let wrong = app.login("dana@example.com", "wrong-password1").await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["code"], "unauthorized");

    let unknown = app.login("nobody@example.com", "secret123").await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["redirect"], "/register");
}

#[tokio::test]
async fn test_session_via_cookie_and_bearer() {
    let app = test_app().await;
    app.register("dana@example.com").await;

    let login = app.login("dana@example.com", "secret123").await;
    assert_eq!(login.status, StatusCode::OK);
    let cookie = login.cookie("easyevents_session").unwrap();
    let token = login.body["token"].as_str().unwrap().to_string();

    let anonymous = app.get("/api/current_user", None).await;
    assert_eq!(anonymous.body["authenticated"], false);

    let by_cookie = app
        .call(Method::GET, "/api/current_user", None, Some(&cookie), None)
        .await;
    assert_eq!(by_cookie.body["authenticated"], true);
    assert_eq!(by_cookie.body["user"]["email"], "dana@example.com");

    let by_token = app.get("/api/current_user", Some(&token)).await;
    assert_eq!(by_token.body["authenticated"], true);

    let logout = app.call(Method::POST, "/api/logout", Some(&token), None, None).await;
    assert_eq!(logout.status, StatusCode::OK);

    let after = app.get("/api/current_user", Some(&token)).await;
    assert_eq!(after.body["authenticated"], false);
}

#[tokio::test]
async fn test_check_user() {
    let app = test_app().await;
    app.register("dana@example.com").await;

    let known = app
        .call(Method::POST, "/api/check_user", None, None, Some(json!({ "email": "Dana@example.com" })))
        .await;
    assert_eq!(known.body["exists"], true);

    let unknown = app
        .call(Method::POST, "/api/check_user", None, None, Some(json!({ "email": "x@example.com" })))
        .await;
    assert_eq!(unknown.body["exists"], false);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = test_app().await;
    let old_token = app.user("dana@example.com").await;

    let unknown = app
        .call(
            Method::POST,
            "/api/password-reset/request",
            None,
            None,
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert!(unknown.body.get("reset_token").is_none());

    let request = app
        .call(
            Method::POST,
            "/api/password-reset/request",
            None,
            None,
            Some(json!({ "email": "dana@example.com" })),
        )
        .await;
    let reset_token = request.body["reset_token"].as_str().unwrap().to_string();

    let bad = app
        .call(
            Method::POST,
            "/api/password-reset/confirm",
            None,
            None,
            Some(json!({ "email": "dana@example.com", "token": "nope", "password": "newpass123" })),
        )
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let confirm = app
        .call(
            Method::POST,
            "/api/password-reset/confirm",
            None,
            None,
            Some(json!({ "email": "dana@example.com", "token": reset_token, "password": "newpass123" })),
        )
        .await;
    assert_eq!(confirm.status, StatusCode::OK);

    // Old sessions are revoked and the old password no longer works
    let me = app.get("/api/current_user", Some(&old_token)).await;
    assert_eq!(me.body["authenticated"], false);
    assert_eq!(app.login("dana@example.com", "secret123").await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.login("dana@example.com", "newpass123").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_filters_only_narrow() {
    let app = test_app().await;

    let all = app.get("/api/venues", None).await;
    let all_ids = ids(&all.body["venues"]);
    assert!(!all_ids.is_empty());

    let queries = [
        "/api/venues?region=north",
        "/api/venues?region=north&guests=500",
        "/api/venues?budget=medium",
        "/api/venues?budget=medium&venue_type=hall",
        "/api/venues?region=nowhere",
        "/api/venues?guests=abc",
    ];

    let mut previous = all_ids.clone();
    for (i, query) in queries.iter().enumerate() {
        let response = app.get(query, None).await;
        assert_eq!(response.status, StatusCode::OK, "{}", query);
        let found = ids(&response.body["venues"]);
        assert!(found.is_subset(&all_ids), "{} widened the results", query);
        if i == 1 || i == 3 {
            assert!(found.is_subset(&previous), "{} widened the results", query);
        }
        previous = found;
    }

    let nowhere = app.get("/api/venues?region=nowhere", None).await;
    assert_eq!(nowhere.body["count"], 0);

    let unparseable = app.get("/api/venues?guests=abc", None).await;
    assert_eq!(ids(&unparseable.body["venues"]), all_ids);
}

#[tokio::test]
async fn test_supplier_listing_by_type_includes_nationwide() {
    let app = test_app().await;

    let orchestras = app.get("/api/suppliers/type/orchestra?region=north", None).await;
    assert_eq!(orchestras.status, StatusCode::OK);
    assert_eq!(orchestras.body["supplier_type"], "Orchestra");
    let cities: Vec<&str> = orchestras.body["suppliers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["city"].as_str().unwrap())
        .collect();
    assert!(cities.contains(&"כל הארץ"));
    assert!(cities.contains(&"חיפה"));
    assert!(!cities.contains(&"באר שבע"));

    let search = app.get("/api/search?region=south", None).await;
    assert_eq!(search.body["success"], true);
    assert!(search.body["venue_count"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_catalog_create_requires_login() {
    let app = test_app().await;
    let body = json!({ "name": "אולם חדש", "city": "חיפה", "style": "Luxury", "capacity": 300 });

    let anonymous = app
        .call(Method::POST, "/api/venues", None, None, Some(body.clone()))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let token = app.user("dana@example.com").await;
    let created = app
        .call(Method::POST, "/api/venues", Some(&token), None, Some(body))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["venue"]["id"].as_str().unwrap().to_string();

    let fetched = app.get(&format!("/api/venues/{}", id), None).await;
    assert_eq!(fetched.body["venue"]["name"], "אולם חדש");

    let bad_type = app
        .call(
            Method::POST,
            "/api/suppliers",
            Some(&token),
            None,
            Some(json!({ "name": "פרחים", "supplier_type": "Florist" })),
        )
        .await;
    assert_eq!(bad_type.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_add_is_idempotent_and_saved_with_event() {
    let app = test_app().await;
    let venue_id = app.first_id("venues").await;
    let supplier_id = app.first_id("suppliers").await;

    let first = app
        .call(Method::POST, "/api/cart", None, None, Some(json!({ "id": venue_id, "type": "venue" })))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["added"], true);
    let cart_cookie = first.cookie("easyevents_cart").unwrap();

    let again = app
        .call(
            Method::POST,
            "/api/cart",
            None,
            Some(&cart_cookie),
            Some(json!({ "id": venue_id, "type": "venue" })),
        )
        .await;
    assert_eq!(again.body["added"], false);
    assert_eq!(again.body["cart"]["count"], 1);

    app.call(
        Method::POST,
        "/api/cart",
        None,
        Some(&cart_cookie),
        Some(json!({ "id": supplier_id, "type": "supplier" })),
    )
    .await;

    let missing = app
        .call(
            Method::POST,
            "/api/cart",
            None,
            Some(&cart_cookie),
            Some(json!({ "id": "missing", "type": "venue" })),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let cart = app
        .call(Method::GET, "/api/cart", None, Some(&cart_cookie), None)
        .await;
    assert_eq!(cart.body["count"], 2);

    // Saving without an explicit vendor list takes the cart and empties it
    let token = app.user("dana@example.com").await;
    let saved = app
        .call(
            Method::POST,
            "/api/events",
            Some(&token),
            Some(&cart_cookie),
            Some(json!({ "name": "בר מצווה", "guest_count": 150 })),
        )
        .await;
    assert_eq!(saved.status, StatusCode::CREATED);
    assert_eq!(saved.body["vendors"].as_array().unwrap().len(), 2);
    assert!(!saved.body["checklist"].as_array().unwrap().is_empty());
    assert_eq!(saved.body["event"]["status"], "planning");

    let emptied = app
        .call(Method::GET, "/api/cart", None, Some(&cart_cookie), None)
        .await;
    assert_eq!(emptied.body["count"], 0);
}

#[tokio::test]
async fn test_cart_remove_and_clear() {
    let app = test_app().await;
    let venue_id = app.first_id("venues").await;

    let added = app
        .call(Method::POST, "/api/cart", None, None, Some(json!({ "id": venue_id, "type": "venue" })))
        .await;
    let cookie = added.cookie("easyevents_cart").unwrap();

    let removed = app
        .call(
            Method::DELETE,
            &format!("/api/cart/venue/{}", venue_id),
            None,
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["count"], 0);

    let again = app
        .call(
            Method::DELETE,
            &format!("/api/cart/venue/{}", venue_id),
            None,
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let cleared = app.call(Method::DELETE, "/api/cart", None, Some(&cookie), None).await;
    assert_eq!(cleared.status, StatusCode::OK);
}

#[tokio::test]
async fn test_idle_anonymous_carts_are_swept() {
    let mut config = Config::default();
    config.server.cart_idle_minutes = 0;
    let app = test_app_with(config).await;
    let venue_id = app.first_id("venues").await;

    for _ in 0..500 {
        let response = app
            .call(Method::POST, "/api/cart", None, None, Some(json!({ "id": venue_id, "type": "venue" })))
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
    assert_eq!(app.state.carts.len(), 500);

    let stats = api::cleanup::run_cleanup(&app.state).await.unwrap();
    assert_eq!(stats.carts_removed, 500);
    assert!(app.state.carts.is_empty());
}

#[tokio::test]
async fn test_cleanup_keeps_active_carts_and_drops_expired_sessions() {
    let app = test_app().await;
    let token = app.user("dana@example.com").await;
    let venue_id = app.first_id("venues").await;

    let added = app
        .call(Method::POST, "/api/cart", None, None, Some(json!({ "id": venue_id, "type": "venue" })))
        .await;
    let cart_cookie = added.cookie("easyevents_cart").unwrap();

    sqlx::query("UPDATE sessions SET expires_at = '2000-01-01T00:00:00Z'")
        .execute(&app.state.db)
        .await
        .unwrap();

    let stats = api::cleanup::run_cleanup(&app.state).await.unwrap();
    assert_eq!(stats.carts_removed, 0);
    assert_eq!(stats.sessions_removed, 1);

    let cart = app.call(Method::GET, "/api/cart", None, Some(&cart_cookie), None).await;
    assert_eq!(cart.body["count"], 1);
    assert_eq!(app.get("/api/current_user", Some(&token)).await.body["authenticated"], false);
}

#[tokio::test]
async fn test_login_purges_expired_sessions() {
    let app = test_app().await;
    app.user("dana@example.com").await;
    sqlx::query("UPDATE sessions SET expires_at = '2000-01-01T00:00:00Z'")
        .execute(&app.state.db)
        .await
        .unwrap();

    assert_eq!(app.login("dana@example.com", "secret123").await.status, StatusCode::OK);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_events_are_private_to_their_owner() {
    let app = test_app().await;
    let owner = app.user("owner@example.com").await;
    let other = app.user("other@example.com").await;

    let created = app.create_event(&owner).await;
    let event_id = created["event"]["id"].as_str().unwrap().to_string();
    let item_id = created["checklist"][0]["id"].as_str().unwrap().to_string();

    let guest = app
        .call(
            Method::POST,
            &format!("/api/events/{}/guests", event_id),
            Some(&owner),
            None,
            Some(json!({ "name": "יוסי", "party_size": 2 })),
        )
        .await;
    assert_eq!(guest.status, StatusCode::CREATED);
    let guest_id = guest.body["guest"]["id"].as_str().unwrap().to_string();

    let event_uri = format!("/api/events/{}", event_id);
    let forbidden = [
        app.call(Method::GET, &event_uri, Some(&other), None, None).await,
        app.call(Method::PUT, &event_uri, Some(&other), None, Some(json!({ "notes": "x" }))).await,
        app.call(Method::DELETE, &event_uri, Some(&other), None, None).await,
        app.call(
            Method::PUT,
            &format!("/api/checklist/{}", item_id),
            Some(&other),
            None,
            Some(json!({ "is_completed": true })),
        )
        .await,
        app.call(Method::DELETE, &format!("/api/guests/{}", guest_id), Some(&other), None, None)
            .await,
        app.call(
            Method::POST,
            &format!("/api/events/{}/guests", event_id),
            Some(&other),
            None,
            Some(json!({ "name": "פולש" })),
        )
        .await,
    ];
    for response in &forbidden {
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body["code"], "forbidden");
    }

    let missing = app
        .call(Method::GET, "/api/events/does-not-exist", Some(&owner), None, None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let anonymous = app.get(&event_uri, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    // The other user sees none of it and nothing changed
    let theirs = app.get("/api/events", Some(&other)).await;
    assert_eq!(theirs.body["count"], 0);
    let detail = app.get(&event_uri, Some(&owner)).await;
    assert_eq!(detail.body["guests"].as_array().unwrap().len(), 1);
    assert_eq!(detail.body["checklist"][0]["is_completed"], false);
}

#[tokio::test]
async fn test_event_patch_only_touches_allowed_fields() {
    let app = test_app().await;
    let token = app.user("dana@example.com").await;
    let created = app.create_event(&token).await;
    let event_id = created["event"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/events/{}", event_id);

    let updated = app
        .call(
            Method::PUT,
            &uri,
            Some(&token),
            None,
            Some(json!({ "status": "confirmed", "guest_count": 220, "user_id": "someone-else" })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["event"]["status"], "confirmed");
    assert_eq!(updated.body["event"]["guest_count"], 220);
    assert_eq!(updated.body["event"]["name"], "החתונה");
    assert_eq!(updated.body["event"]["user_id"], created["event"]["user_id"]);

    let bad_status = app
        .call(Method::PUT, &uri, Some(&token), None, Some(json!({ "status": "partying" })))
        .await;
    assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);

    let empty = app.call(Method::PUT, &uri, Some(&token), None, Some(json!({}))).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_date_in_patch_clears_it() {
    let app = test_app().await;
    let token = app.user("dana@example.com").await;
    let created = app.create_event(&token).await;
    let uri = format!("/api/events/{}", created["event"]["id"].as_str().unwrap());

    let dated = app
        .call(Method::PUT, &uri, Some(&token), None, Some(json!({ "event_date": "2026-09-01" })))
        .await;
    assert_eq!(dated.body["event"]["event_date"], "2026-09-01");

    // Other fields alone leave the date untouched
    let renamed = app
        .call(Method::PUT, &uri, Some(&token), None, Some(json!({ "notes": "בגן" })))
        .await;
    assert_eq!(renamed.body["event"]["event_date"], "2026-09-01");

    let cleared = app
        .call(Method::PUT, &uri, Some(&token), None, Some(json!({ "event_date": "" })))
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.body["event"]["event_date"].is_null());

    let item = app
        .call(
            Method::POST,
            &format!("{}/checklist", uri),
            Some(&token),
            None,
            Some(json!({ "title": "להזמין צלם", "due_date": "2026-08-01" })),
        )
        .await;
    let item_uri = format!("/api/checklist/{}", item.body["item"]["id"].as_str().unwrap());

    let item_cleared = app
        .call(Method::PUT, &item_uri, Some(&token), None, Some(json!({ "due_date": "" })))
        .await;
    assert_eq!(item_cleared.status, StatusCode::OK);
    assert!(item_cleared.body["item"]["due_date"].is_null());
}

#[tokio::test]
async fn test_event_vendors_checklist_and_guests() {
    let app = test_app().await;
    let token = app.user("dana@example.com").await;
    let created = app.create_event(&token).await;
    let event_id = created["event"]["id"].as_str().unwrap().to_string();
    let supplier_id = app.first_id("suppliers").await;

    let vendor_uri = format!("/api/events/{}/vendors", event_id);
    let vendor = app
        .call(
            Method::POST,
            &vendor_uri,
            Some(&token),
            None,
            Some(json!({ "id": supplier_id, "type": "supplier" })),
        )
        .await;
    assert_eq!(vendor.status, StatusCode::CREATED);
    let duplicate = app
        .call(
            Method::POST,
            &vendor_uri,
            Some(&token),
            None,
            Some(json!({ "id": supplier_id, "type": "supplier" })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let removed = app
        .call(
            Method::DELETE,
            &format!("{}/{}", vendor_uri, supplier_id),
            Some(&token),
            None,
            None,
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let item = app
        .call(
            Method::POST,
            &format!("/api/events/{}/checklist", event_id),
            Some(&token),
            None,
            Some(json!({ "title": "להזמין פרחים", "due_date": "2026-05-01" })),
        )
        .await;
    assert_eq!(item.status, StatusCode::CREATED);
    let item_id = item.body["item"]["id"].as_str().unwrap().to_string();

    let done = app
        .call(
            Method::PUT,
            &format!("/api/checklist/{}", item_id),
            Some(&token),
            None,
            Some(json!({ "is_completed": true })),
        )
        .await;
    assert_eq!(done.body["item"]["is_completed"], true);
    assert_eq!(done.body["item"]["title"], "להזמין פרחים");

    let guests_uri = format!("/api/events/{}/guests", event_id);
    for (name, status, size) in [("יוסי", "attending", 2), ("רינה", "declined", 1), ("אבי", "pending", 3)] {
        let response = app
            .call(
                Method::POST,
                &guests_uri,
                Some(&token),
                None,
                Some(json!({ "name": name, "rsvp_status": status, "party_size": size })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let too_many = app
        .call(
            Method::POST,
            &guests_uri,
            Some(&token),
            None,
            Some(json!({ "name": "משפחה גדולה", "party_size": 80 })),
        )
        .await;
    assert_eq!(too_many.status, StatusCode::BAD_REQUEST);

    let summary = app
        .get(&format!("/api/events/{}/guests/summary", event_id), Some(&token))
        .await;
    assert_eq!(summary.body["summary"]["invited"], 3);
    assert_eq!(summary.body["summary"]["total_people"], 6);
    assert_eq!(summary.body["summary"]["attending_people"], 2);
    assert_eq!(summary.body["summary"]["declined"], 1);

    let deleted = app
        .call(Method::DELETE, &format!("/api/events/{}", event_id), Some(&token), None, None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    let (left,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM guests WHERE event_id = ?")
        .bind(&event_id)
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    assert_eq!(left, 0);
}

#[tokio::test]
async fn test_dev_seed_routes_are_gated() {
    let app = test_app().await;
    let hidden = app.call(Method::POST, "/api/dev/seed-venues", None, None, None).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let mut config = Config::default();
    config.dev.seed_routes = true;
    let dev = test_app_with(config).await;
    let seeded = dev.call(Method::POST, "/api/dev/seed-venues", None, None, None).await;
    assert_eq!(seeded.status, StatusCode::CREATED);
    assert_eq!(seeded.body["inserted"], 0);

    let stats = dev.get("/api/stats", None).await;
    assert!(stats.body["stats"]["total_venues"].as_i64().unwrap() > 0);
    assert_eq!(stats.body["stats"]["total_events"], 0);
}

#[tokio::test]
async fn test_image_endpoints() {
    let app = test_app().await;

    let manifest = app.get("/api/images", None).await;
    assert_eq!(manifest.status, StatusCode::OK);
    assert_eq!(manifest.body["total_images"], 0);

    let empty = app.get("/api/images/hall?count=3", None).await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body["count"], 0);

    let unknown = app.get("/api/images/spaceships?count=4", None).await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(unknown.body["count"], 0);
    assert_eq!(unknown.body["category"], "spaceships");

    let food = app.get("/api/images/food?food_type=dairy", None).await;
    assert_eq!(food.body["category"], "food_Milk");
}

#[tokio::test]
async fn test_pages() {
    let app = test_app().await;

    let home = app.get("/", None).await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.text.contains("EasyEvents"));

    let results = app.get("/results?region=center&venue_type=hall", None).await;
    assert_eq!(results.status, StatusCode::OK);
    assert!(results.text.contains("add-to-cart"));

    let dashboard = app.get("/dashboard", None).await;
    assert_eq!(dashboard.status, StatusCode::SEE_OTHER);
    assert_eq!(dashboard.headers[header::LOCATION], "/login");

    let owner = app.user("owner@example.com").await;
    let other = app.user("other@example.com").await;
    let event = app.create_event(&owner).await;
    let uri = format!("/events/{}", event["event"]["id"].as_str().unwrap());

    let mine = app.get(&uri, Some(&owner)).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert!(mine.text.contains("החתונה"));

    let theirs = app.get(&uri, Some(&other)).await;
    assert_eq!(theirs.status, StatusCode::FORBIDDEN);

    let list = app.get("/dashboard", Some(&owner)).await;
    assert_eq!(list.status, StatusCode::OK);
    assert!(list.text.contains(&uri));
}
