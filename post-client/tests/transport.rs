use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use post_client::{
    ClientError, CredentialStore, Credentials, HttpTransport, MemoryCredentialStore, PostClient,
    PostQuery, Role, SortDirection, TransportConfig,
};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Recorded {
    authorization: Arc<Mutex<Vec<Option<String>>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl Recorded {
    fn remember(&self, headers: &HeaderMap) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.authorization.lock().expect("lock").push(auth);
    }
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some("Bearer T")
}

fn user_json(id: i64, username: &str, role: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "firstName": "Ivan",
        "lastName": "Petrov",
        "gender": "M",
        "role": role,
    })
}

fn post_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": "content long enough",
        "author": { "id": 1, "username": "admin", "firstName": "Ad", "lastName": "Min" },
        "createdAt": 1_757_505_600_000_i64,
        "updatedAt": "2025-09-10T12:00:00.000+00:00",
    })
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["username"] == "admin" && body["password"] == "admin123" {
        return (
            StatusCode::OK,
            Json(json!({
                "user": user_json(1, "admin", "ROLE_ADMIN"),
                "data": { "jwt": "T" },
            })),
        );
    }
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "code": "BAD_CREDENTIALS", "message": "Bad credentials" })),
    )
}

async fn list_posts(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    recorded.remember(&headers);
    recorded
        .queries
        .lock()
        .expect("lock")
        .push(query.unwrap_or_default());
    Json(json!({
        "success": true,
        "message": "ok",
        "data": {
            "posts": [post_json(7, "seven"), post_json(8, "eight")],
            "currentPage": 0,
            "totalPages": 1,
            "totalElements": 2,
            "hasNext": false,
            "hasPrevious": false,
        }
    }))
}

async fn get_post(Path(id): Path<i64>) -> impl IntoResponse {
    if id == 999 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "POST_NOT_FOUND", "message": "Post not found" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": "ok", "data": post_json(id, "fetched") })),
    )
}

async fn delete_post(headers: HeaderMap) -> StatusCode {
    if is_authorized(&headers) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn current_user(headers: HeaderMap) -> impl IntoResponse {
    if !is_authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "expired" })));
    }
    (StatusCode::OK, Json(user_json(1, "admin", "ROLE_ADMIN")))
}

async fn update_user(Path(_id): Path<i64>) -> impl IntoResponse {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "code": "ACCESS_DENIED", "message": "Access denied" })),
    )
}

async fn spawn_backend() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/{id}", get(get_post).delete(delete_post))
        .route("/api/users/me", get(current_user))
        .route("/api/users/{id}", put(update_user))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend");
    });

    (format!("http://{addr}/api"), recorded)
}

fn transport(base_url: &str, store: Arc<MemoryCredentialStore>) -> HttpTransport {
    let config = TransportConfig {
        base_url: base_url.to_string(),
        ..TransportConfig::default()
    };
    HttpTransport::new(config, store).expect("transport")
}

#[tokio::test]
async fn login_persists_token_and_next_calls_carry_bearer() {
    let (base_url, recorded) = spawn_backend().await;
    let store = Arc::new(MemoryCredentialStore::default());
    let mut client = PostClient::new(transport(&base_url, store.clone()), store.clone());

    client
        .login(&Credentials {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        })
        .await
        .expect("login");

    assert!(client.session().is_authenticated());
    assert_eq!(client.session().token.as_deref(), Some("T"));
    assert_eq!(client.session().role(), Some(Role::Admin));
    assert_eq!(store.load().as_deref(), Some("T"));

    client
        .fetch_posts(PostQuery::default())
        .await
        .expect("posts");
    let seen = recorded.authorization.lock().expect("lock").clone();
    assert_eq!(seen, vec![Some("Bearer T".to_string())]);
}

#[tokio::test]
async fn filters_are_sent_as_literal_query_parameters() {
    let (base_url, recorded) = spawn_backend().await;
    let store = Arc::new(MemoryCredentialStore::with_token("T"));
    let mut client = PostClient::new(transport(&base_url, store.clone()), store);

    let page = client
        .fetch_posts(PostQuery {
            page: Some(0),
            size: Some(10),
            sort_by: Some("title".to_string()),
            direction: Some(SortDirection::Asc),
            my_posts: true,
        })
        .await
        .expect("posts");
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_items, 2);

    let queries = recorded.queries.lock().expect("lock").clone();
    assert_eq!(
        queries,
        vec!["page=0&size=10&sortBy=title&direction=asc&my-posts=true".to_string()]
    );
}

#[tokio::test]
async fn unauthorized_response_clears_store_and_runs_hook() {
    let (base_url, _recorded) = spawn_backend().await;
    let store = Arc::new(MemoryCredentialStore::with_token("stale"));
    let redirects = Arc::new(AtomicUsize::new(0));
    let hook_redirects = Arc::clone(&redirects);
    let api = transport(&base_url, store.clone()).with_unauthorized_hook(move || {
        hook_redirects.fetch_add(1, Ordering::SeqCst);
    });
    let mut client = PostClient::new(api, store.clone());
    assert!(client.check_auth_status());

    let err = client.delete_post(7).await.expect_err("must be rejected");

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(store.load().is_none());
    assert_eq!(redirects.load(Ordering::SeqCst), 1);
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn server_error_payload_reaches_the_caller() {
    let (base_url, _recorded) = spawn_backend().await;
    let store = Arc::new(MemoryCredentialStore::with_token("T"));
    let mut client = PostClient::new(transport(&base_url, store.clone()), store.clone());

    let err = client
        .update_user_role(2, Role::Admin)
        .await
        .expect_err("forbidden");

    match &err {
        ClientError::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(*status, 403);
            assert_eq!(code.as_deref(), Some("ACCESS_DENIED"));
            assert_eq!(message, "Access denied");
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(client.users().error.as_deref(), Some("Access denied"));
    // 403 не сбрасывает сессию.
    assert_eq!(store.load().as_deref(), Some("T"));
}

#[tokio::test]
async fn missing_post_becomes_not_found_state() {
    let (base_url, _recorded) = spawn_backend().await;
    let store = Arc::new(MemoryCredentialStore::default());
    let mut client = PostClient::new(transport(&base_url, store.clone()), store);

    assert!(client.fetch_post(999).await.expect("not an error").is_none());
    assert!(client.posts().current_not_found);

    let post = client.fetch_post(3).await.expect("post").cloned();
    assert_eq!(post.map(|p| p.title), Some("fetched".to_string()));
}

#[tokio::test]
async fn rejected_login_is_reported_as_bad_credentials() {
    let (base_url, _recorded) = spawn_backend().await;
    let store = Arc::new(MemoryCredentialStore::default());
    let mut client = PostClient::new(transport(&base_url, store.clone()), store);

    let err = client
        .login(&Credentials {
            username: "admin".to_string(),
            password: "wrong-password".to_string(),
        })
        .await
        .expect_err("rejected");

    assert!(err.is_unauthorized());
    assert_eq!(
        client.session().error.as_deref(),
        Some(post_client::store::INVALID_CREDENTIALS)
    );
}
