use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use leptos::logging;
use leptos::prelude::*;
use post_client::{
    BackendApi, ClientError, ClientResult, CredentialStore, Credentials, LoginOutcome, PageResult,
    Post, PostDraft, PostQuery, Registration, Role, RoleChange, User, wire,
};
use serde::Serialize;
use serde_json::Value;

use crate::storage::LocalStorageCredentialStore;

const API_BASE_URL: &str = match option_env!("WASM_API_BASE_URL") {
    Some(value) => value,
    None => "http://localhost:8080/api",
};

fn endpoint(path: &str) -> String {
    format!(
        "{}/{}",
        API_BASE_URL.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn network(err: gloo_net::Error) -> ClientError {
    ClientError::Network(err.to_string())
}

#[derive(Clone, Copy)]
/// Браузерный транспорт поверх `fetch`.
///
/// Разбор ответов общий с хостовым клиентом (`post_client::wire`).
/// На 401 очищает `localStorage` и вызывает `on_unauthorized`.
pub(crate) struct BrowserApi {
    on_unauthorized: Callback<()>,
}

impl BrowserApi {
    pub(crate) fn new(on_unauthorized: Callback<()>) -> Self {
        Self { on_unauthorized }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match LocalStorageCredentialStore.load() {
            Some(token) => builder.header("Authorization", &format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<Value> {
        let request = self.authorized(builder).build().map_err(network)?;
        self.execute(request).await
    }

    async fn send_json<T: Serialize>(&self, builder: RequestBuilder, body: &T) -> ClientResult<Value> {
        let request = self.authorized(builder).json(body).map_err(network)?;
        self.execute(request).await
    }

    async fn execute(&self, request: Request) -> ClientResult<Value> {
        let response = request.send().await.map_err(network)?;
        self.read(response).await
    }

    async fn read(&self, response: Response) -> ClientResult<Value> {
        let status = response.status();
        if status == 401 {
            if let Err(err) = LocalStorageCredentialStore.clear() {
                logging::warn!("failed to clear stored credential after 401: {err}");
            }
            self.on_unauthorized.run(());
            return Err(ClientError::Unauthorized);
        }

        let text = response.text().await.map_err(network)?;
        if !response.ok() {
            return Err(wire::decode_error(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| ClientError::Decode(err.to_string()))
    }
}

#[async_trait(?Send)]
impl BackendApi for BrowserApi {
    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginOutcome> {
        let body = self
            .send_json(Request::post(&endpoint("/auth/login")), credentials)
            .await?;
        wire::decode_login(body)
    }

    async fn register(&self, registration: &Registration) -> ClientResult<User> {
        let body = self
            .send_json(Request::post(&endpoint("/auth/register")), registration)
            .await?;
        wire::decode_registered(body)
    }

    async fn list_posts(&self, query: &PostQuery) -> ClientResult<PageResult<Post>> {
        let pairs = query.query_pairs();
        let builder = Request::get(&endpoint("/posts"))
            .query(pairs.iter().map(|(key, value)| (*key, value.as_str())));
        let body = self.send(builder).await?;
        wire::normalize_post_page(body, query.effective_size())
    }

    async fn get_post(&self, id: i64) -> ClientResult<Post> {
        let body = self.send(Request::get(&endpoint(&format!("/posts/{id}")))).await?;
        wire::decode(body)
    }

    async fn create_post(&self, draft: &PostDraft) -> ClientResult<Post> {
        let body = self.send_json(Request::post(&endpoint("/posts")), draft).await?;
        wire::decode(body)
    }

    async fn update_post(&self, id: i64, draft: &PostDraft) -> ClientResult<Post> {
        let body = self
            .send_json(Request::put(&endpoint(&format!("/posts/{id}"))), draft)
            .await?;
        wire::decode(body)
    }

    async fn delete_post(&self, id: i64) -> ClientResult<()> {
        self.send(Request::delete(&endpoint(&format!("/posts/{id}"))))
            .await?;
        Ok(())
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        let body = self.send(Request::get(&endpoint("/users"))).await?;
        wire::decode_users(body)
    }

    async fn current_user(&self) -> ClientResult<User> {
        let body = self.send(Request::get(&endpoint("/users/me"))).await?;
        wire::decode(body)
    }

    async fn delete_user(&self, id: i64) -> ClientResult<()> {
        self.send(Request::delete(&endpoint(&format!("/users/{id}"))))
            .await?;
        Ok(())
    }

    async fn update_user_role(&self, id: i64, role: Role) -> ClientResult<Option<User>> {
        let body = self
            .send_json(Request::put(&endpoint(&format!("/users/{id}"))), &RoleChange { role })
            .await?;
        wire::decode_optional_user(body)
    }
}
