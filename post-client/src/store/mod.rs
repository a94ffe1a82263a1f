//! Контейнеры клиентского состояния.
//!
//! Каждый срез (сессия, посты, пользователи) хранит данные и меняется только
//! через `reduce`. Операции из `ops` выполняют запрос к `BackendApi` и сводят
//! его результат в переходы; `PostClient` владеет срезами и вызывает их.

pub mod ops;
mod posts;
mod session;
mod users;

use std::sync::Arc;

use tracing::{debug, warn};

pub use ops::{Dispatch, INVALID_CREDENTIALS, login_failure_message};
pub use posts::{PostAction, PostState};
pub use session::{SESSION_EXPIRED, SessionAction, SessionState, SessionStatus};
pub use users::{UserAction, UserState};

use crate::api::BackendApi;
use crate::credentials::CredentialStore;
use crate::error::ClientResult;
use crate::models::{Credentials, PageResult, Post, PostDraft, PostQuery, Registration, Role, User};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Переход любого из срезов.
pub enum Action {
    /// Переход сессии.
    Session(SessionAction),
    /// Переход кэша постов.
    Posts(PostAction),
    /// Переход списка пользователей.
    Users(UserAction),
}

impl From<SessionAction> for Action {
    fn from(action: SessionAction) -> Self {
        Self::Session(action)
    }
}

impl From<PostAction> for Action {
    fn from(action: PostAction) -> Self {
        Self::Posts(action)
    }
}

impl From<UserAction> for Action {
    fn from(action: UserAction) -> Self {
        Self::Users(action)
    }
}

#[derive(Debug, Default)]
struct Slices {
    session: SessionState,
    posts: PostState,
    users: UserState,
}

impl Dispatch for Slices {
    fn dispatch(&mut self, action: Action) {
        debug!(?action, "dispatch");
        match action {
            Action::Session(action) => self.session.reduce(action),
            Action::Posts(action) => self.posts.reduce(action),
            Action::Users(action) => self.users.reduce(action),
        }
    }
}

/// Владелец срезов состояния и точка входа для всех операций клиента.
pub struct PostClient<A> {
    api: A,
    credentials: Arc<dyn CredentialStore>,
    slices: Slices,
}

impl<A: BackendApi> PostClient<A> {
    /// Создаёт клиент с пустыми срезами.
    pub fn new(api: A, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            api,
            credentials,
            slices: Slices::default(),
        }
    }

    /// Сессия.
    pub fn session(&self) -> &SessionState {
        &self.slices.session
    }

    /// Кэш постов.
    pub fn posts(&self) -> &PostState {
        &self.slices.posts
    }

    /// Список пользователей.
    pub fn users(&self) -> &UserState {
        &self.slices.users
    }

    /// API, через которое идут запросы.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Применяет переход к соответствующему срезу.
    pub fn dispatch(&mut self, action: impl Into<Action>) {
        self.slices.dispatch(action.into());
    }

    /// Выполняет вход, сохраняет токен и, если backend не прислал профиль,
    /// догружает его через `GET /users/me`.
    pub async fn login(&mut self, credentials: &Credentials) -> ClientResult<()> {
        ops::login(&self.api, self.credentials.as_ref(), &mut self.slices, credentials).await
    }

    /// Регистрирует пользователя. Сессия не создаётся.
    pub async fn register(
        &mut self,
        registration: &Registration,
        confirm_password: &str,
    ) -> ClientResult<User> {
        ops::register(&self.api, &mut self.slices, registration, confirm_password).await
    }

    /// Локальный выход: очищает сессию и сохранённый токен, запросов не делает.
    pub fn logout(&mut self) {
        if let Err(err) = ops::logout(self.credentials.as_ref(), &mut self.slices) {
            warn!(error = %err, "failed to clear stored credential");
        }
    }

    /// Проверяет только наличие сохранённого токена, сервер не спрашивает.
    pub fn check_auth_status(&mut self) -> bool {
        ops::check_auth_status(self.credentials.as_ref(), &mut self.slices)
    }

    /// Загружает профиль текущего пользователя.
    pub async fn refresh_current_user(&mut self) -> ClientResult<User> {
        ops::refresh_current_user(&self.api, &mut self.slices).await
    }

    /// Загружает страницу постов и целиком заменяет ею кэш.
    pub async fn fetch_posts(&mut self, query: PostQuery) -> ClientResult<&PageResult<Post>> {
        ops::fetch_posts(&self.api, &mut self.slices, query).await?;
        Ok(&self.slices.posts.page)
    }

    /// Загружает пост для детального просмотра. `None`, если поста нет.
    pub async fn fetch_post(&mut self, id: i64) -> ClientResult<Option<&Post>> {
        ops::fetch_post(&self.api, &mut self.slices, id).await?;
        Ok(self.slices.posts.current.as_ref())
    }

    /// Создаёт пост. Черновик проверяется локально, невалидный не уходит в сеть.
    pub async fn create_post(&mut self, draft: &PostDraft) -> ClientResult<Post> {
        ops::create_post(&self.api, &mut self.slices, draft).await
    }

    /// Обновляет пост.
    pub async fn update_post(&mut self, id: i64, draft: &PostDraft) -> ClientResult<Post> {
        ops::update_post(&self.api, &mut self.slices, id, draft).await
    }

    /// Удаляет пост.
    pub async fn delete_post(&mut self, id: i64) -> ClientResult<()> {
        ops::delete_post(&self.api, &mut self.slices, id).await
    }

    /// Загружает всех пользователей.
    pub async fn fetch_users(&mut self) -> ClientResult<&[User]> {
        ops::fetch_users(&self.api, &mut self.slices).await?;
        Ok(&self.slices.users.users)
    }

    /// Удаляет пользователя.
    pub async fn delete_user(&mut self, id: i64) -> ClientResult<()> {
        ops::delete_user(&self.api, &mut self.slices, id).await
    }

    /// Меняет роль пользователя.
    pub async fn update_user_role(&mut self, id: i64, role: Role) -> ClientResult<()> {
        ops::update_user_role(&self.api, &mut self.slices, id, role).await
    }

    /// Сбрасывает текущий пост.
    pub fn clear_current_post(&mut self) {
        self.dispatch(PostAction::ClearCurrent);
    }

    /// Сбрасывает ошибки всех срезов.
    pub fn clear_errors(&mut self) {
        self.dispatch(SessionAction::ClearError);
        self.dispatch(PostAction::ClearError);
        self.dispatch(UserAction::ClearError);
    }
}
