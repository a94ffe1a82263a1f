//! Операции клиента: запрос к `BackendApi` и сведение его результата в переходы.
//!
//! Функции не владеют срезами, они пишут переходы в `Dispatch`. Так одни и те же
//! операции работают и над `PostClient`, и над сигналами браузерного приложения.

use tracing::{info, warn};

use super::{Action, PostAction, SessionAction, UserAction};
use crate::api::BackendApi;
use crate::credentials::CredentialStore;
use crate::error::{ClientError, ClientResult};
use crate::models::{Credentials, Post, PostDraft, PostQuery, Registration, Role, User};

/// Текст ошибки входа, когда backend отверг логин или пароль.
pub const INVALID_CREDENTIALS: &str = "Неверное имя пользователя или пароль";

/// Владелец срезов, принимающий переходы.
pub trait Dispatch {
    /// Применяет переход к соответствующему срезу.
    fn dispatch(&mut self, action: Action);

    /// То же, что `dispatch`, для переходов отдельного среза.
    fn apply(&mut self, action: impl Into<Action>)
    where
        Self: Sized,
    {
        self.dispatch(action.into());
    }
}

/// Сообщение для пользователя о неудачном входе.
pub fn login_failure_message(err: &ClientError) -> String {
    if err.is_unauthorized() {
        INVALID_CREDENTIALS.to_string()
    } else {
        err.user_message()
    }
}

/// Вход: проверка формы, запрос, сохранение токена, при необходимости профиль.
///
/// `Ok` только если сессия в итоге `Authenticated`: 401 при догрузке профиля
/// завершает сессию и возвращается как ошибка входа.
pub async fn login<A, C, D>(
    api: &A,
    credentials: &C,
    store: &mut D,
    form: &Credentials,
) -> ClientResult<()>
where
    A: BackendApi + ?Sized,
    C: CredentialStore + ?Sized,
    D: Dispatch,
{
    form.validate().map_err(ClientError::Validation)?;

    store.apply(SessionAction::LoginStarted);
    let outcome = match api.login(form).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(username = %form.username, error = %err, "login failed");
            store.apply(SessionAction::LoginFailed(login_failure_message(&err)));
            return Err(err);
        }
    };

    if let Err(err) = credentials.save(&outcome.token) {
        store.apply(SessionAction::LoginFailed(err.user_message()));
        return Err(err);
    }

    let needs_profile = outcome.user.is_none();
    store.apply(SessionAction::LoginSucceeded(outcome));
    info!(username = %form.username, "logged in");

    if needs_profile {
        match refresh_current_user(api, store).await {
            Ok(_) => {}
            Err(err) if err.is_unauthorized() => return Err(err),
            Err(err) => warn!(error = %err, "failed to load profile after login"),
        }
    }
    Ok(())
}

/// Регистрация. Сессия не создаётся.
pub async fn register<A, D>(
    api: &A,
    store: &mut D,
    registration: &Registration,
    confirm_password: &str,
) -> ClientResult<User>
where
    A: BackendApi + ?Sized,
    D: Dispatch,
{
    registration
        .validate(confirm_password)
        .map_err(ClientError::Validation)?;

    store.apply(SessionAction::RegisterStarted);
    match api.register(registration).await {
        Ok(user) => {
            info!(username = %user.username, "registered");
            store.apply(SessionAction::RegisterSucceeded);
            Ok(user)
        }
        Err(err) => {
            store.apply(SessionAction::RegisterFailed(err.user_message()));
            Err(err)
        }
    }
}

/// Локальный выход. Сессия сбрасывается, даже если токен не удалось стереть.
pub fn logout<C, D>(credentials: &C, store: &mut D) -> ClientResult<()>
where
    C: CredentialStore + ?Sized,
    D: Dispatch,
{
    let cleared = credentials.clear();
    store.apply(SessionAction::LoggedOut);
    info!("logged out");
    cleared
}

/// Восстанавливает сессию по сохранённому токену; сервер не спрашивает.
pub fn check_auth_status<C, D>(credentials: &C, store: &mut D) -> bool
where
    C: CredentialStore + ?Sized,
    D: Dispatch,
{
    let token = credentials.load();
    let present = token.is_some();
    store.apply(SessionAction::Restored(token));
    present
}

/// Загружает профиль текущего пользователя.
pub async fn refresh_current_user<A, D>(api: &A, store: &mut D) -> ClientResult<User>
where
    A: BackendApi + ?Sized,
    D: Dispatch,
{
    match api.current_user().await {
        Ok(user) => {
            store.apply(SessionAction::ProfileLoaded(user.clone()));
            Ok(user)
        }
        Err(err) => {
            forced_logout(store, &err);
            Err(err)
        }
    }
}

/// Загружает страницу постов и целиком заменяет ею кэш.
pub async fn fetch_posts<A, D>(api: &A, store: &mut D, query: PostQuery) -> ClientResult<()>
where
    A: BackendApi + ?Sized,
    D: Dispatch,
{
    store.apply(PostAction::FetchStarted(query.clone()));
    match api.list_posts(&query).await {
        Ok(page) => {
            tracing::debug!(
                items = page.items.len(),
                total = page.total_items,
                "posts page loaded"
            );
            store.apply(PostAction::PageLoaded(page));
            Ok(())
        }
        Err(err) => Err(posts_failed(store, err)),
    }
}

/// Загружает пост для детального просмотра. `false`, если поста нет.
pub async fn fetch_post<A, D>(api: &A, store: &mut D, id: i64) -> ClientResult<bool>
where
    A: BackendApi + ?Sized,
    D: Dispatch,
{
    store.apply(PostAction::PostRequested);
    match api.get_post(id).await {
        Ok(post) => {
            store.apply(PostAction::PostLoaded(post));
            Ok(true)
        }
        Err(err) if err.is_not_found() => {
            tracing::debug!(id, "post not found");
            store.apply(PostAction::PostNotFound);
            Ok(false)
        }
        Err(err) => Err(posts_failed(store, err)),
    }
}

/// Создаёт пост. Невалидный черновик не уходит в сеть.
pub async fn create_post<A, D>(api: &A, store: &mut D, draft: &PostDraft) -> ClientResult<Post>
where
    A: BackendApi + ?Sized,
    D: Dispatch,
{
    let draft = draft.validate().map_err(ClientError::Validation)?;

    store.apply(PostAction::MutationStarted);
    match api.create_post(&draft).await {
        Ok(post) => {
            info!(id = post.id, "post created");
            store.apply(PostAction::Created(post.clone()));
            Ok(post)
        }
        Err(err) => Err(posts_failed(store, err)),
    }
}

/// Обновляет пост; `Updated` применён к моменту возврата.
pub async fn update_post<A, D>(
    api: &A,
    store: &mut D,
    id: i64,
    draft: &PostDraft,
) -> ClientResult<Post>
where
    A: BackendApi + ?Sized,
    D: Dispatch,
{
    let draft = draft.validate().map_err(ClientError::Validation)?;

    store.apply(PostAction::MutationStarted);
    match api.update_post(id, &draft).await {
        Ok(post) => {
            info!(id, "post updated");
            store.apply(PostAction::Updated(post.clone()));
            Ok(post)
        }
        Err(err) => Err(posts_failed(store, err)),
    }
}

/// Удаляет пост.
pub async fn delete_post<A, D>(api: &A, store: &mut D, id: i64) -> ClientResult<()>
where
    A: BackendApi + ?Sized,
    D: Dispatch,
{
    store.apply(PostAction::MutationStarted);
    match api.delete_post(id).await {
        Ok(()) => {
            info!(id, "post deleted");
            store.apply(PostAction::Deleted(id));
            Ok(())
        }
        Err(err) => Err(posts_failed(store, err)),
    }
}

/// Загружает всех пользователей.
pub async fn fetch_users<A, D>(api: &A, store: &mut D) -> ClientResult<()>
where
    A: BackendApi + ?Sized,
    D: Dispatch,
{
    store.apply(UserAction::FetchStarted);
    match api.list_users().await {
        Ok(users) => {
            store.apply(UserAction::Loaded(users));
            Ok(())
        }
        Err(err) => Err(users_failed(store, err)),
    }
}

/// Удаляет пользователя.
pub async fn delete_user<A, D>(api: &A, store: &mut D, id: i64) -> ClientResult<()>
where
    A: BackendApi + ?Sized,
    D: Dispatch,
{
    store.apply(UserAction::MutationStarted);
    match api.delete_user(id).await {
        Ok(()) => {
            info!(id, "user deleted");
            store.apply(UserAction::Deleted(id));
            Ok(())
        }
        Err(err) => Err(users_failed(store, err)),
    }
}

/// Меняет роль. Если backend не вернул пользователя, роль патчится на месте.
pub async fn update_user_role<A, D>(api: &A, store: &mut D, id: i64, role: Role) -> ClientResult<()>
where
    A: BackendApi + ?Sized,
    D: Dispatch,
{
    store.apply(UserAction::MutationStarted);
    match api.update_user_role(id, role).await {
        Ok(user) => {
            info!(id, %role, "user role changed");
            store.apply(UserAction::RoleChanged { id, role, user });
            Ok(())
        }
        Err(err) => Err(users_failed(store, err)),
    }
}

fn forced_logout<D: Dispatch>(store: &mut D, err: &ClientError) {
    if err.is_unauthorized() {
        store.apply(SessionAction::ForcedLogout);
    }
}

fn posts_failed<D: Dispatch>(store: &mut D, err: ClientError) -> ClientError {
    forced_logout(store, &err);
    store.apply(PostAction::Failed(err.user_message()));
    err
}

fn users_failed<D: Dispatch>(store: &mut D, err: ClientError) -> ClientError {
    forced_logout(store, &err);
    store.apply(UserAction::Failed(err.user_message()));
    err
}
