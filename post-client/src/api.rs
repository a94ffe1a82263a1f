use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{
    Credentials, LoginOutcome, PageResult, Post, PostDraft, PostQuery, Registration, Role, User,
};

/// REST API backend, с которым работают контейнеры состояния.
///
/// Реализация отвечает за подстановку bearer-токена и за реакцию на 401:
/// удаляет сохранённый токен и возвращает `ClientError::Unauthorized`.
///
/// В браузере (`wasm32`) futures не `Send`: там `fetch` живёт в одном потоке.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait BackendApi: Send + Sync {
    /// `POST /auth/login`.
    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginOutcome>;
    /// `POST /auth/register`. Сессию не создаёт.
    async fn register(&self, registration: &Registration) -> ClientResult<User>;
    /// `GET /posts` с фильтрами, ответ уже нормализован.
    async fn list_posts(&self, query: &PostQuery) -> ClientResult<PageResult<Post>>;
    /// `GET /posts/{id}`.
    async fn get_post(&self, id: i64) -> ClientResult<Post>;
    /// `POST /posts`.
    async fn create_post(&self, draft: &PostDraft) -> ClientResult<Post>;
    /// `PUT /posts/{id}`.
    async fn update_post(&self, id: i64, draft: &PostDraft) -> ClientResult<Post>;
    /// `DELETE /posts/{id}`.
    async fn delete_post(&self, id: i64) -> ClientResult<()>;
    /// `GET /users`.
    async fn list_users(&self) -> ClientResult<Vec<User>>;
    /// `GET /users/me`.
    async fn current_user(&self) -> ClientResult<User>;
    /// `DELETE /users/{id}`.
    async fn delete_user(&self, id: i64) -> ClientResult<()>;
    /// `PUT /users/{id}` с новой ролью. Backend может не вернуть пользователя.
    async fn update_user_role(&self, id: i64, role: Role) -> ClientResult<Option<User>>;
}
