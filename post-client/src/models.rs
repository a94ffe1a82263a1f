use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Размер страницы постов, который backend использует по умолчанию.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// Роль пользователя.
///
/// На проводе роли передаются как `ROLE_USER` / `ROLE_ADMIN`; голые `USER` / `ADMIN`
/// тоже принимаются.
pub enum Role {
    /// Обычный пользователь.
    #[default]
    #[serde(rename = "ROLE_USER", alias = "USER")]
    User,
    /// Администратор.
    #[serde(rename = "ROLE_ADMIN", alias = "ADMIN")]
    Admin,
}

impl Role {
    /// Строковое представление роли в формате backend.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("USER"),
            Self::Admin => f.write_str("ADMIN"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase();
        match normalized.trim_start_matches("ROLE_") {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("unknown role: {raw}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель пользователя (профиль сессии и строка админки).
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    #[serde(default)]
    pub email: String,
    /// Имя.
    #[serde(default)]
    pub first_name: String,
    /// Фамилия.
    #[serde(default)]
    pub last_name: String,
    /// Пол в том виде, в каком его хранит backend (`M`, `F`, ...).
    #[serde(default)]
    pub gender: Option<String>,
    /// Роль. Если backend её не прислал, считается `USER`.
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Является ли пользователь администратором.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Имя и фамилия через пробел.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Автор поста.
pub struct Author {
    /// Идентификатор автора.
    pub id: i64,
    /// Логин автора.
    pub username: String,
    /// Имя.
    #[serde(default)]
    pub first_name: String,
    /// Фамилия.
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок поста.
    pub title: String,
    /// Содержимое поста.
    pub content: String,
    /// Автор поста.
    pub author: Author,
    /// Дата и время создания поста (UTC).
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC).
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Одна загруженная страница коллекции.
///
/// Инварианты: `items.len() <= page_size`, а при `total_items > 0`
/// выполняется `page_index < total_pages`.
pub struct PageResult<T> {
    /// Элементы страницы.
    pub items: Vec<T>,
    /// Номер страницы, с нуля.
    pub page_index: u32,
    /// Размер страницы.
    pub page_size: u32,
    /// Общее количество элементов.
    pub total_items: u64,
    /// Общее количество страниц.
    pub total_pages: u32,
}

impl<T> PageResult<T> {
    /// Пустая страница заданного размера.
    pub fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page_index: 0,
            page_size,
            total_items: 0,
            total_pages: 0,
        }
    }

    /// На странице нет ни одного элемента.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Есть ли страница после текущей.
    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.total_pages
    }

    /// Есть ли страница перед текущей.
    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self::empty(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Направление сортировки списка постов.
pub enum SortDirection {
    /// По возрастанию.
    Asc,
    /// По убыванию.
    #[default]
    Desc,
}

impl SortDirection {
    /// Значение параметра `direction`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Фильтры запроса `GET /posts`.
pub struct PostQuery {
    /// Номер страницы, с нуля.
    pub page: Option<u32>,
    /// Размер страницы.
    pub size: Option<u32>,
    /// Поле сортировки, например `createdAt` или `title`.
    pub sort_by: Option<String>,
    /// Направление сортировки.
    pub direction: Option<SortDirection>,
    /// Только посты текущего пользователя.
    pub my_posts: bool,
}

impl PostQuery {
    /// Параметры строки запроса в том виде, в каком их ждёт backend.
    ///
    /// Незаданные поля пропускаются, `my-posts` передаётся только когда он `true`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        if let Some(sort_by) = self.sort_by.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("sortBy", sort_by.to_string()));
        }
        if let Some(direction) = self.direction {
            pairs.push(("direction", direction.as_str().to_string()));
        }
        if self.my_posts {
            pairs.push(("my-posts", "true".to_string()));
        }
        pairs
    }

    /// Размер страницы, который ожидается в ответе.
    pub fn effective_size(&self) -> u32 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Данные для входа.
pub struct Credentials {
    /// Логин.
    pub username: String,
    /// Пароль.
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Профиль для регистрации.
pub struct Registration {
    /// Логин.
    pub username: String,
    /// Пароль.
    pub password: String,
    /// Имя.
    pub first_name: String,
    /// Фамилия.
    pub last_name: String,
    /// Пол (`M` / `F`).
    pub gender: String,
    /// Email.
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Заголовок и текст поста для создания или обновления.
pub struct PostDraft {
    /// Заголовок поста.
    pub title: String,
    /// Содержимое поста.
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Тело `PUT /users/{id}` при смене роли.
pub struct RoleChange {
    /// Новая роль.
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Результат успешного входа.
pub struct LoginOutcome {
    /// JWT access token.
    pub token: String,
    /// Данные пользователя, если backend их вернул.
    pub user: Option<User>,
}

/// Backend сериализует `java.util.Date`: это либо миллисекунды эпохи, либо строка.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    pub(super) fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {ms}"))),
            Raw::Text(text) => parse_text(&text).map_err(D::Error::custom),
        }
    }

    fn parse_text(text: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(dt.with_timezone(&Utc));
        }
        // LocalDateTime без смещения трактуем как UTC.
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|err| format!("invalid timestamp '{text}': {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn post_accepts_millis_and_rfc3339_timestamps() {
        let raw = r#"{
            "id": 3,
            "title": "Title",
            "content": "Some content",
            "author": {"id": 1, "username": "admin", "firstName": "A", "lastName": "B"},
            "createdAt": 1757505600000,
            "updatedAt": "2025-09-10T12:30:00.000+00:00"
        }"#;

        let post: Post = serde_json::from_str(raw).expect("post should parse");
        assert_eq!(
            post.created_at,
            Utc.with_ymd_and_hms(2025, 9, 10, 12, 0, 0).unwrap()
        );
        assert_eq!(
            post.updated_at,
            Utc.with_ymd_and_hms(2025, 9, 10, 12, 30, 0).unwrap()
        );
        assert_eq!(post.author.username, "admin");
    }

    #[test]
    fn post_accepts_local_date_time_without_offset() {
        let raw = r#"{"id":1,"title":"t","content":"c","author":{"id":1,"username":"u"},
            "createdAt":"2025-09-10T08:00:00","updatedAt":"2025-09-10T08:00:00.123"}"#;
        let post: Post = serde_json::from_str(raw).expect("post should parse");
        assert_eq!(
            post.created_at,
            Utc.with_ymd_and_hms(2025, 9, 10, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn user_defaults_missing_role_to_user() {
        let user: User = serde_json::from_str(r#"{"id":5,"username":"bob"}"#)
            .expect("user should parse");
        assert_eq!(user.role, Role::User);
        assert!(user.email.is_empty());
        assert!(!user.is_admin());
    }

    #[test]
    fn role_accepts_prefixed_and_bare_forms() {
        let admin: Role = serde_json::from_str(r#""ROLE_ADMIN""#).expect("prefixed");
        let bare: Role = serde_json::from_str(r#""ADMIN""#).expect("bare");
        assert_eq!(admin, Role::Admin);
        assert_eq!(bare, Role::Admin);
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""ROLE_USER""#);
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("role_user".parse::<Role>(), Ok(Role::User));
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn query_pairs_are_literal_backend_parameters() {
        let query = PostQuery {
            page: Some(2),
            size: Some(5),
            sort_by: Some("title".to_string()),
            direction: Some(SortDirection::Asc),
            my_posts: true,
        };

        let pairs = query.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page", "2".to_string()),
                ("size", "5".to_string()),
                ("sortBy", "title".to_string()),
                ("direction", "asc".to_string()),
                ("my-posts", "true".to_string()),
            ]
        );
    }

    #[test]
    fn query_pairs_skip_unset_fields_and_false_flag() {
        let query = PostQuery {
            sort_by: Some(String::new()),
            ..PostQuery::default()
        };
        assert!(query.query_pairs().is_empty());
        assert_eq!(query.effective_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn page_navigation_flags() {
        let mut page: PageResult<i64> = PageResult::empty(10);
        assert!(!page.has_next());
        assert!(!page.has_previous());

        page.total_pages = 3;
        page.page_index = 1;
        assert!(page.has_next());
        assert!(page.has_previous());
    }
}
