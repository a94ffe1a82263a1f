use crate::models::{LoginOutcome, Role, User};

/// Текст ошибки сессии после принудительного выхода по 401.
pub const SESSION_EXPIRED: &str = "Сессия истекла, войдите снова";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Состояние автомата сессии.
pub enum SessionStatus {
    /// Пользователь не вошёл.
    #[default]
    Anonymous,
    /// Запрос входа в полёте.
    Authenticating,
    /// Пользователь вошёл.
    Authenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Сессия текущего пользователя.
pub struct SessionState {
    /// Состояние автомата.
    pub status: SessionStatus,
    /// Профиль пользователя, если известен.
    pub user: Option<User>,
    /// JWT-токен.
    pub token: Option<String>,
    /// Запрос регистрации в полёте.
    pub registering: bool,
    /// Последняя ошибка входа или регистрации.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Переходы сессии.
pub enum SessionAction {
    /// Отправлен запрос входа.
    LoginStarted,
    /// Вход выполнен.
    LoginSucceeded(LoginOutcome),
    /// Вход не удался.
    LoginFailed(String),
    /// Отправлен запрос регистрации.
    RegisterStarted,
    /// Регистрация завершилась успешно; сессия при этом не создаётся.
    RegisterSucceeded,
    /// Регистрация не удалась.
    RegisterFailed(String),
    /// Загружен профиль текущего пользователя.
    ProfileLoaded(User),
    /// Проверка сохранённого токена при старте.
    Restored(Option<String>),
    /// Пользователь вышел сам.
    LoggedOut,
    /// Backend ответил 401, сессия сброшена.
    ForcedLogout,
    /// Сбросить ошибку.
    ClearError,
}

impl SessionState {
    /// Применяет переход.
    pub fn reduce(&mut self, action: SessionAction) {
        match action {
            SessionAction::LoginStarted => {
                self.status = SessionStatus::Authenticating;
                self.error = None;
            }
            SessionAction::LoginSucceeded(outcome) => {
                self.status = SessionStatus::Authenticated;
                self.token = Some(outcome.token);
                self.user = outcome.user;
                self.error = None;
            }
            SessionAction::LoginFailed(message) => {
                self.status = SessionStatus::Anonymous;
                self.token = None;
                self.user = None;
                self.error = Some(message);
            }
            SessionAction::RegisterStarted => {
                self.registering = true;
                self.error = None;
            }
            SessionAction::RegisterSucceeded => {
                self.registering = false;
            }
            SessionAction::RegisterFailed(message) => {
                self.registering = false;
                self.error = Some(message);
            }
            SessionAction::ProfileLoaded(user) => {
                if self.is_authenticated() {
                    self.user = Some(user);
                }
            }
            SessionAction::Restored(Some(token)) => {
                self.status = SessionStatus::Authenticated;
                self.token = Some(token);
            }
            SessionAction::Restored(None) => {
                *self = Self::default();
            }
            SessionAction::LoggedOut => {
                *self = Self::default();
            }
            SessionAction::ForcedLogout => {
                *self = Self {
                    error: Some(SESSION_EXPIRED.to_string()),
                    ..Self::default()
                };
            }
            SessionAction::ClearError => {
                self.error = None;
            }
        }
    }

    /// Пользователь вошёл.
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// Идёт вход.
    pub fn is_authenticating(&self) -> bool {
        self.status == SessionStatus::Authenticating
    }

    /// Идентификатор вошедшего пользователя.
    pub fn subject_id(&self) -> Option<i64> {
        self.authenticated_user().map(|user| user.id)
    }

    /// Логин вошедшего пользователя.
    pub fn username(&self) -> Option<&str> {
        self.authenticated_user().map(|user| user.username.as_str())
    }

    /// Роль вошедшего пользователя.
    pub fn role(&self) -> Option<Role> {
        self.authenticated_user().map(|user| user.role)
    }

    /// Профиль, только если сессия активна.
    pub fn authenticated_user(&self) -> Option<&User> {
        if !self.is_authenticated() {
            return None;
        }
        self.user.as_ref()
    }
}
