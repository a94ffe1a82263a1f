//! Разбор ответов backend.
//!
//! Все транспорты (reqwest на хосте, gloo-net в браузере) получают тело как
//! `serde_json::Value` и превращают его в модели только через функции этого модуля.
//!
//! Backend заворачивает ответы в `{ success, message, data }`. Каноническая форма
//! страницы постов — `PaginatedPostsResponse`: `{ posts, currentPage, totalPages,
//! totalElements, hasNext, hasPrevious }`. Страница Spring (`{ content, number, ... }`)
//! и голый массив принимаются как устаревшие формы и пишутся в лог; всё остальное
//! считается ошибкой.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{ClientError, ClientResult};
use crate::models::{LoginOutcome, PageResult, Post, User};

#[derive(Debug, Default, Deserialize)]
/// Тело ответа с ошибкой.
pub struct ErrorBody {
    /// Машинный код ошибки.
    pub code: Option<String>,
    /// Человекочитаемое сообщение.
    pub message: Option<String>,
    /// Альтернативное поле с сообщением.
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostsPageDto {
    posts: Vec<Post>,
    #[serde(default)]
    current_page: i64,
    #[serde(default)]
    total_pages: i64,
    #[serde(default)]
    total_elements: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpringPageDto {
    content: Vec<Post>,
    #[serde(default)]
    number: i64,
    #[serde(default)]
    size: i64,
    #[serde(default)]
    total_elements: i64,
    #[serde(default)]
    total_pages: i64,
}

/// Превращает ответ с ошибкой в `ClientError`, вытаскивая код и сообщение из тела.
pub fn decode_error(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ClientError::from_status(status, parsed.code, parsed.message.or(parsed.error)),
        Err(_) => {
            let text = body.trim();
            // HTML-страницы ошибок прокси пользователю не показываем.
            let message = (!text.is_empty() && !text.starts_with('<')).then(|| text.to_string());
            ClientError::from_status(status, None, message)
        }
    }
}

/// Снимает обёртку `{ success, message, data }`, если она есть.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("data")
                && (map.contains_key("success") || map.contains_key("message")) =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Декодирует сущность, завёрнутую или нет в стандартную обёртку.
pub fn decode<T: DeserializeOwned>(value: Value) -> ClientResult<T> {
    serde_json::from_value(unwrap_envelope(value)).map_err(|err| ClientError::Decode(err.to_string()))
}

/// Разбирает ответ `POST /auth/login`: `{ user?, data: { jwt } }`.
pub fn decode_login(value: Value) -> ClientResult<LoginOutcome> {
    let token = value
        .get("data")
        .and_then(|data| data.get("jwt"))
        .or_else(|| value.get("jwt"))
        .and_then(Value::as_str)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ClientError::UnexpectedShape("login response carries no jwt".to_string()))?
        .to_string();

    let user = match value
        .get("user")
        .or_else(|| value.get("data").and_then(|data| data.get("user")))
    {
        None | Some(Value::Null) => None,
        Some(raw) => Some(
            serde_json::from_value::<User>(raw.clone())
                .map_err(|err| ClientError::Decode(err.to_string()))?,
        ),
    };

    Ok(LoginOutcome { token, user })
}

/// Разбирает ответ `POST /auth/register`: `{ user }` или обёртку с профилем в `data`.
pub fn decode_registered(value: Value) -> ClientResult<User> {
    if let Some(user) = value.get("user").filter(|user| user.is_object()) {
        return serde_json::from_value(user.clone())
            .map_err(|err| ClientError::Decode(err.to_string()));
    }
    decode(value)
}

/// Единственная точка нормализации ответа `GET /posts` в `PageResult`.
///
/// `requested_size` используется, когда ответ не сообщает размер страницы.
pub fn normalize_post_page(value: Value, requested_size: u32) -> ClientResult<PageResult<Post>> {
    let page = match unwrap_envelope(value) {
        Value::Object(map) if map.contains_key("posts") => {
            let dto: PostsPageDto = from_object(map)?;
            let page_size = requested_size.max(len_u32(dto.posts.len()));
            PageResult {
                items: dto.posts,
                page_index: clamp_u32(dto.current_page),
                page_size,
                total_items: dto.total_elements.max(0) as u64,
                total_pages: clamp_u32(dto.total_pages),
            }
        }
        Value::Object(map) if map.contains_key("content") => {
            warn!("posts page arrived in legacy spring page shape");
            let dto: SpringPageDto = from_object(map)?;
            let size = if dto.size > 0 {
                clamp_u32(dto.size)
            } else {
                requested_size
            };
            let page_size = size.max(len_u32(dto.content.len()));
            PageResult {
                items: dto.content,
                page_index: clamp_u32(dto.number),
                page_size,
                total_items: dto.total_elements.max(0) as u64,
                total_pages: clamp_u32(dto.total_pages),
            }
        }
        Value::Array(items) => {
            warn!("posts page arrived as a bare array");
            let posts: Vec<Post> = serde_json::from_value(Value::Array(items))
                .map_err(|err| ClientError::Decode(err.to_string()))?;
            let len = len_u32(posts.len());
            PageResult {
                items: posts,
                page_index: 0,
                page_size: requested_size.max(len),
                total_items: u64::from(len),
                total_pages: u32::from(len > 0),
            }
        }
        other => {
            return Err(ClientError::UnexpectedShape(format!(
                "posts page: expected envelope, page object or array, got {}",
                describe(&other)
            )));
        }
    };

    if page.total_items > 0 && page.page_index >= page.total_pages {
        return Err(ClientError::UnexpectedShape(format!(
            "posts page: page index {} out of range for {} pages",
            page.page_index, page.total_pages
        )));
    }
    Ok(page)
}

/// Разбирает список пользователей: обёртку с массивом или голый массив.
pub fn decode_users(value: Value) -> ClientResult<Vec<User>> {
    match unwrap_envelope(value) {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => serde_json::from_value(Value::Array(items))
            .map_err(|err| ClientError::Decode(err.to_string())),
        other => Err(ClientError::UnexpectedShape(format!(
            "user list: expected array, got {}",
            describe(&other)
        ))),
    }
}

/// Ответ на изменение роли может не содержать пользователя.
pub fn decode_optional_user(value: Value) -> ClientResult<Option<User>> {
    match unwrap_envelope(value) {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        other => decode(other).map(Some),
    }
}

fn from_object<T: DeserializeOwned>(map: serde_json::Map<String, Value>) -> ClientResult<T> {
    serde_json::from_value(Value::Object(map)).map_err(|err| ClientError::Decode(err.to_string()))
}

fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object without posts/content",
    }
}
