use thiserror::Error;

use crate::validation::FieldErrors;

/// Сообщение, которое показывается, когда сервер не прислал своего текста.
pub const GENERIC_FAILURE: &str = "Не удалось выполнить запрос. Попробуйте ещё раз.";

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `post-client`.
pub enum ClientError {
    /// Ошибка HTTP-транспорта (`reqwest` на хосте).
    #[error("http error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Запрос не дошёл до сервера (сеть, CORS, таймаут в браузере).
    #[error("network error: {0}")]
    Network(String),

    /// Сервер ответил 401: сессия недействительна, токен уже удалён.
    #[error("unauthorized")]
    Unauthorized,

    /// Сервер ответил ошибкой, отличной от 401.
    #[error("request failed with status {status}: {message}")]
    Api {
        /// HTTP-статус.
        status: u16,
        /// Код ошибки из тела ответа, если есть.
        code: Option<String>,
        /// Текст ошибки из тела ответа или общий текст.
        message: String,
    },

    /// Ответ имеет форму, которую клиент не умеет разбирать.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// Тело ответа не удалось декодировать.
    #[error("decode error: {0}")]
    Decode(String),

    /// Локальная проверка формы не прошла, запрос не отправлялся.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Ошибка хранилища токена.
    #[error("credential storage error: {0}")]
    Storage(String),
}

/// Результат операций `post-client`.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Строит ошибку по статусу ответа и разобранному телу.
    pub fn from_status(status: u16, code: Option<String>, message: Option<String>) -> Self {
        if status == 401 {
            return Self::Unauthorized;
        }
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        Self::Api {
            status,
            code,
            message,
        }
    }

    #[cfg(feature = "native")]
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16(), None, None);
        }
        Self::Http(Box::new(err))
    }

    /// Сессия сброшена из-за ответа 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Ресурс не найден: вид показывает «ничего не найдено», а не ошибку.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Текст для уведомления пользователю.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Unauthorized => "Сессия истекла, войдите снова".to_string(),
            Self::Validation(_) => "Проверьте правильность заполнения полей".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;

    #[test]
    fn status_401_is_unauthorized() {
        let err = ClientError::from_status(401, Some("X".into()), Some("bad token".into()));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn forbidden_is_not_folded_into_unauthorized() {
        let err = ClientError::from_status(403, None, Some("Access denied".into()));
        assert!(!err.is_unauthorized());
        assert_eq!(err.user_message(), "Access denied");
    }

    #[test]
    fn missing_message_falls_back_to_generic_text() {
        let err = ClientError::from_status(500, None, Some("   ".into()));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        assert!(ClientError::Network("offline".into()).user_message() == GENERIC_FAILURE);
    }

    #[test]
    fn not_found_is_detected_by_status() {
        let err = ClientError::from_status(404, Some("POST_NOT_FOUND".into()), None);
        assert!(err.is_not_found());
        match err {
            ClientError::Api { code, .. } => assert_eq!(code.as_deref(), Some("POST_NOT_FOUND")),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn validation_error_lists_fields() {
        let mut errors = FieldErrors::new();
        errors.record(Field::Content, Some("too short"));
        let err = ClientError::Validation(errors);
        assert_eq!(err.to_string(), "validation failed: content: too short");
    }
}
