//! Операции видов: общие операции `post_client::store::ops` над сигналами,
//! плюс то, что касается только браузера (уведомления и переходы).

use leptos::logging;
use leptos::prelude::*;
use leptos::task::spawn_local;
use post_client::store::{login_failure_message, ops};
use post_client::{Credentials, FieldErrors, PostDraft, PostQuery, Registration, Role, Severity};

use crate::state::AppState;
use crate::storage::LocalStorageCredentialStore;
use crate::view_model::Route;

/// Проверка токена при старте: только наличие, профиль догружается в фоне.
pub(crate) fn check_auth_status(state: AppState) {
    let mut store = state;
    if ops::check_auth_status(&LocalStorageCredentialStore, &mut store) {
        refresh_current_user(state);
    }
}

pub(crate) fn refresh_current_user(state: AppState) {
    spawn_local(async move {
        let mut store = state;
        if let Err(err) = ops::refresh_current_user(&state.api, &mut store).await {
            logging::warn!("failed to load profile: {err}");
            state.report(&err);
        }
    });
}

/// Возвращает ошибки полей, если форма не прошла проверку; иначе запрос уходит в фоне.
pub(crate) fn login(state: AppState, credentials: Credentials) -> Result<(), FieldErrors> {
    credentials.validate()?;

    spawn_local(async move {
        let mut store = state;
        match ops::login(&state.api, &LocalStorageCredentialStore, &mut store, &credentials).await {
            Ok(()) => {
                state.notify("Вход выполнен", Severity::Success);
                state.navigate(Route::Posts);
            }
            Err(err) => state.notify(login_failure_message(&err), Severity::Error),
        }
    });
    Ok(())
}

pub(crate) fn register(
    state: AppState,
    registration: Registration,
    confirm_password: &str,
) -> Result<(), FieldErrors> {
    registration.validate(confirm_password)?;

    let confirm_password = confirm_password.to_string();
    spawn_local(async move {
        let mut store = state;
        match ops::register(&state.api, &mut store, &registration, &confirm_password).await {
            Ok(_) => {
                state.notify("Регистрация успешна, теперь войдите", Severity::Success);
                state.navigate(Route::Login);
            }
            Err(err) => state.notify(err.user_message(), Severity::Error),
        }
    });
    Ok(())
}

pub(crate) fn logout(state: AppState) {
    let mut store = state;
    if let Err(err) = ops::logout(&LocalStorageCredentialStore, &mut store) {
        state.notify(err.user_message(), Severity::Warning);
    }
    state.users.set(Default::default());
    state.navigate(Route::Posts);
}

pub(crate) fn fetch_posts(state: AppState, query: PostQuery) {
    spawn_local(async move {
        let mut store = state;
        if let Err(err) = ops::fetch_posts(&state.api, &mut store, query).await {
            state.report(&err);
        }
    });
}

pub(crate) fn fetch_post(state: AppState, id: i64) {
    spawn_local(async move {
        let mut store = state;
        if let Err(err) = ops::fetch_post(&state.api, &mut store, id).await {
            state.report(&err);
        }
    });
}

pub(crate) fn create_post(state: AppState, draft: PostDraft) -> Result<(), FieldErrors> {
    let draft = draft.validate()?;

    spawn_local(async move {
        let mut store = state;
        match ops::create_post(&state.api, &mut store, &draft).await {
            Ok(_) => state.notify("Пост создан", Severity::Success),
            Err(err) => state.report(&err),
        }
    });
    Ok(())
}

/// После ответа сервера сначала применяется `Updated`, и только потом открывается пост.
pub(crate) fn update_post(state: AppState, id: i64, draft: PostDraft) -> Result<(), FieldErrors> {
    let draft = draft.validate()?;

    spawn_local(async move {
        let mut store = state;
        match ops::update_post(&state.api, &mut store, id, &draft).await {
            Ok(_) => {
                state.notify("Пост обновлён", Severity::Success);
                state.navigate(Route::PostDetail(id));
            }
            Err(err) => state.report(&err),
        }
    });
    Ok(())
}

pub(crate) fn delete_post(state: AppState, id: i64) {
    spawn_local(async move {
        let mut store = state;
        match ops::delete_post(&state.api, &mut store, id).await {
            Ok(()) => {
                state.notify("Пост удалён", Severity::Success);
                if matches!(state.route.get_untracked(), Route::PostDetail(current) if current == id)
                {
                    state.navigate(Route::Posts);
                }
            }
            Err(err) => state.report(&err),
        }
    });
}

pub(crate) fn fetch_users(state: AppState) {
    spawn_local(async move {
        let mut store = state;
        if let Err(err) = ops::fetch_users(&state.api, &mut store).await {
            state.report(&err);
        }
    });
}

pub(crate) fn delete_user(state: AppState, id: i64) {
    spawn_local(async move {
        let mut store = state;
        match ops::delete_user(&state.api, &mut store, id).await {
            Ok(()) => state.notify("Пользователь удалён", Severity::Success),
            Err(err) => state.report(&err),
        }
    });
}

pub(crate) fn update_user_role(state: AppState, id: i64, role: Role) {
    spawn_local(async move {
        let mut store = state;
        match ops::update_user_role(&state.api, &mut store, id, role).await {
            Ok(()) => state.notify("Роль пользователя обновлена", Severity::Success),
            Err(err) => state.report(&err),
        }
    });
}
