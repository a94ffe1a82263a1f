use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::BackendApi;
use crate::credentials::CredentialStore;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Credentials, LoginOutcome, PageResult, Post, PostDraft, PostQuery, Registration, Role,
    RoleChange, User,
};
use crate::wire;

/// Базовый URL backend по умолчанию.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Колбэк, который вызывается после ответа 401 («перейти на страницу входа»).
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone)]
/// Параметры HTTP-транспорта.
pub struct TransportConfig {
    /// Базовый URL REST API, например `http://localhost:8080/api`.
    pub base_url: String,
    /// Таймаут установки соединения.
    pub connect_timeout: Duration,
    /// Таймаут всего запроса.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Clone)]
/// HTTP-клиент для работы с REST API backend.
///
/// Каждый запрос берёт токен из `CredentialStore`; ответ 401 очищает хранилище,
/// вызывает hook и завершает запрос ошибкой `ClientError::Unauthorized`.
pub struct HttpTransport {
    base_url: String,
    client: Client,
    credentials: Arc<dyn CredentialStore>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("has_unauthorized_hook", &self.on_unauthorized.is_some())
            .finish()
    }
}

impl HttpTransport {
    /// Создаёт транспорт поверх хранилища токена.
    pub fn new(
        config: TransportConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::from_reqwest)?;

        Ok(Self {
            base_url: config.base_url,
            client,
            credentials,
            on_unauthorized: None,
        })
    }

    /// Устанавливает реакцию на 401, например переход к форме входа.
    pub fn with_unauthorized_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.endpoint(path);
        debug!(%method, %url, "sending request");

        let mut request = self.client.request(method, url);
        if let Some(token) = self.credentials.load() {
            request = request.bearer_auth(token);
        }
        request
    }

    fn handle_unauthorized(&self) {
        warn!("backend answered 401, dropping stored credential");
        if let Err(err) = self.credentials.clear() {
            warn!(error = %err, "failed to clear stored credential");
        }
        if let Some(hook) = &self.on_unauthorized {
            hook();
        }
    }

    /// Отправляет запрос и возвращает JSON-тело успешного ответа (`Null` для пустого).
    async fn execute(&self, request: RequestBuilder) -> ClientResult<Value> {
        let response = request.send().await.map_err(ClientError::from_reqwest)?;
        let status = response.status();
        debug!(status = status.as_u16(), "response received");

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(wire::decode_error(status.as_u16(), &body));
        }

        let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))
    }
}

#[async_trait]
impl BackendApi for HttpTransport {
    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginOutcome> {
        let body = self
            .execute(self.request(Method::POST, "/auth/login").json(credentials))
            .await?;
        wire::decode_login(body)
    }

    async fn register(&self, registration: &Registration) -> ClientResult<User> {
        let body = self
            .execute(self.request(Method::POST, "/auth/register").json(registration))
            .await?;
        wire::decode_registered(body)
    }

    async fn list_posts(&self, query: &PostQuery) -> ClientResult<PageResult<Post>> {
        let body = self
            .execute(self.request(Method::GET, "/posts").query(&query.query_pairs()))
            .await?;
        wire::normalize_post_page(body, query.effective_size())
    }

    async fn get_post(&self, id: i64) -> ClientResult<Post> {
        let body = self
            .execute(self.request(Method::GET, &format!("/posts/{id}")))
            .await?;
        wire::decode(body)
    }

    async fn create_post(&self, draft: &PostDraft) -> ClientResult<Post> {
        let body = self
            .execute(self.request(Method::POST, "/posts").json(draft))
            .await?;
        wire::decode(body)
    }

    async fn update_post(&self, id: i64, draft: &PostDraft) -> ClientResult<Post> {
        let body = self
            .execute(self.request(Method::PUT, &format!("/posts/{id}")).json(draft))
            .await?;
        wire::decode(body)
    }

    async fn delete_post(&self, id: i64) -> ClientResult<()> {
        self.execute(self.request(Method::DELETE, &format!("/posts/{id}")))
            .await?;
        Ok(())
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        let body = self.execute(self.request(Method::GET, "/users")).await?;
        wire::decode_users(body)
    }

    async fn current_user(&self) -> ClientResult<User> {
        let body = self.execute(self.request(Method::GET, "/users/me")).await?;
        wire::decode(body)
    }

    async fn delete_user(&self, id: i64) -> ClientResult<()> {
        self.execute(self.request(Method::DELETE, &format!("/users/{id}")))
            .await?;
        Ok(())
    }

    async fn update_user_role(&self, id: i64, role: Role) -> ClientResult<Option<User>> {
        let body = self
            .execute(
                self.request(Method::PUT, &format!("/users/{id}"))
                    .json(&RoleChange { role }),
            )
            .await?;
        wire::decode_optional_user(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;

    fn transport(base_url: &str) -> HttpTransport {
        let config = TransportConfig {
            base_url: base_url.to_string(),
            ..TransportConfig::default()
        };
        HttpTransport::new(config, Arc::new(MemoryCredentialStore::default()))
            .expect("client must build")
    }

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = transport("http://localhost:8080/api/");
        let full = client.endpoint("/posts");
        assert_eq!(full, "http://localhost:8080/api/posts");
    }

    #[test]
    fn default_config_points_to_local_backend() {
        let config = TransportConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.connect_timeout < config.timeout);
    }

    #[test]
    fn unauthorized_clears_store_and_runs_hook() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let store = Arc::new(MemoryCredentialStore::with_token("T"));
        let calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = Arc::clone(&calls);
        let client = HttpTransport::new(TransportConfig::default(), store.clone())
            .expect("client must build")
            .with_unauthorized_hook(move || {
                hook_calls.fetch_add(1, Ordering::SeqCst);
            });

        client.handle_unauthorized();

        assert!(store.load().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
