use std::collections::HashMap;

use leptos::prelude::*;
use post_client::store::{Dispatch, PostAction, SessionAction, UserAction};
use post_client::{
    Action, ClientError, DEFAULT_TTL, NotificationId, NotificationQueue, PostState, SessionState,
    Severity, UserState,
};

use crate::api::BrowserApi;
use crate::view_model::{self, Route};

#[derive(Clone, Copy)]
/// Срезы состояния приложения в сигналах Leptos.
///
/// Срезы меняются только через `reduce`, как и в хостовом `PostClient`.
pub(crate) struct AppState {
    pub(crate) session: RwSignal<SessionState>,
    pub(crate) posts: RwSignal<PostState>,
    pub(crate) users: RwSignal<UserState>,
    pub(crate) toasts: RwSignal<NotificationQueue>,
    pub(crate) route: RwSignal<Route>,
    pub(crate) api: BrowserApi,
    timers: StoredValue<HashMap<NotificationId, TimeoutHandle>>,
}

impl AppState {
    pub(crate) fn new() -> Self {
        let session = RwSignal::new(SessionState::default());
        let route = RwSignal::new(Route::default());
        // Сессию сбрасывает сама операция (`ForcedLogout`), транспорт только уводит на вход.
        let api = BrowserApi::new(Callback::new(move |_| route.set(Route::Login)));

        Self {
            session,
            posts: RwSignal::new(PostState::default()),
            users: RwSignal::new(UserState::default()),
            toasts: RwSignal::new(NotificationQueue::new()),
            route,
            api,
            timers: StoredValue::new(HashMap::new()),
        }
    }

    pub(crate) fn session_action(&self, action: SessionAction) {
        self.session.update(|s| s.reduce(action));
    }

    pub(crate) fn post_action(&self, action: PostAction) {
        self.posts.update(|s| s.reduce(action));
    }

    pub(crate) fn user_action(&self, action: UserAction) {
        self.users.update(|s| s.reduce(action));
    }

    /// Добавляет уведомление и запускает его обратный отсчёт.
    pub(crate) fn notify(&self, message: impl Into<String>, severity: Severity) {
        let mut admitted = None;
        self.toasts
            .update(|queue| admitted = queue.enqueue_with_ttl(message, severity, DEFAULT_TTL));
        let Some(id) = admitted else {
            return;
        };

        let state = *self;
        let handle = set_timeout_with_handle(
            move || {
                state.timers.update_value(|timers| {
                    timers.remove(&id);
                });
                state.toasts.update(|queue| {
                    queue.expire(id);
                });
            },
            DEFAULT_TTL,
        );
        if let Ok(handle) = handle {
            self.timers.update_value(|timers| {
                timers.insert(id, handle);
            });
        }
    }

    /// Закрывает уведомление; таймеры остальных не трогаются.
    pub(crate) fn dismiss(&self, id: NotificationId) {
        self.timers.update_value(|timers| {
            if let Some(handle) = timers.remove(&id) {
                handle.clear();
            }
        });
        self.toasts.update(|queue| {
            queue.dismiss(id);
        });
    }

    /// Очищает уведомления и отменяет все таймеры.
    pub(crate) fn clear_toasts(&self) {
        self.timers.update_value(|timers| {
            for (_, handle) in timers.drain() {
                handle.clear();
            }
        });
        self.toasts.update(|queue| {
            queue.clear();
        });
    }

    /// Показывает ошибку операции. 401 не показывается: его уже обработал транспорт.
    pub(crate) fn report(&self, err: &ClientError) {
        if !err.is_unauthorized() {
            self.notify(err.user_message(), Severity::Error);
        }
    }

    /// Переход на экран; закрытые экраны без нужных прав уводят на вход или в ленту.
    pub(crate) fn navigate(&self, route: Route) {
        let target = self
            .session
            .with_untracked(|session| view_model::guard_route(route, session));
        self.route.set(target);
    }
}

impl Dispatch for AppState {
    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Session(action) => self.session_action(action),
            Action::Posts(action) => self.post_action(action),
            Action::Users(action) => self.user_action(action),
        }
    }
}
