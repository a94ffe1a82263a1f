//! Клиентская проверка полей форм.
//!
//! Проверки носят рекомендательный характер: окончательное решение за backend,
//! и его ошибка валидации считается авторитетной даже если локально всё прошло.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Credentials, PostDraft, Registration};

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("username pattern is valid"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

const USERNAME_MIN: usize = 3;
const PASSWORD_MIN: usize = 6;
const NAME_MIN: usize = 2;
const TITLE_RANGE: (usize, usize) = (3, 200);
const CONTENT_RANGE: (usize, usize) = (10, 5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Поле формы.
pub enum Field {
    /// Логин.
    Username,
    /// Пароль.
    Password,
    /// Подтверждение пароля.
    ConfirmPassword,
    /// Имя.
    FirstName,
    /// Фамилия.
    LastName,
    /// Email.
    Email,
    /// Пол.
    Gender,
    /// Заголовок поста.
    Title,
    /// Текст поста.
    Content,
}

impl Field {
    /// Имя поля в форме.
    pub fn name(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Gender => "gender",
            Self::Title => "title",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Форма, правила которой применяются к полю.
pub enum Form {
    /// Вход.
    Login,
    /// Регистрация.
    Registration,
    /// Создание или редактирование поста.
    Post,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Ошибки валидации по полям, в порядке полей формы.
pub struct FieldErrors(BTreeMap<Field, &'static str>);

impl FieldErrors {
    /// Пустой набор ошибок.
    pub fn new() -> Self {
        Self::default()
    }

    /// Запоминает ошибку поля, если она есть.
    pub fn record(&mut self, field: Field, error: Option<&'static str>) {
        if let Some(message) = error {
            self.0.insert(field, message);
        }
    }

    /// Ошибка конкретного поля.
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    /// Ошибок нет.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Количество полей с ошибкой.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Пары (поле, сообщение).
    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Проверяет одно поле формы. `None` означает, что значение корректно.
///
/// Поля, которых нет в форме, всегда считаются корректными.
/// Подтверждение пароля проверяется отдельно, см. [`validate_confirm_password`].
pub fn validate_field(form: Form, field: Field, value: &str) -> Option<&'static str> {
    match (form, field) {
        (Form::Login | Form::Registration, Field::Username) => {
            if value.trim().is_empty() {
                Some("Введите имя пользователя")
            } else if value.chars().count() < USERNAME_MIN {
                Some("Имя пользователя должно содержать не менее 3 символов")
            } else if form == Form::Registration && !USERNAME_RE.is_match(value) {
                Some("Имя пользователя может содержать только буквы, цифры и подчёркивание")
            } else {
                None
            }
        }
        (Form::Login | Form::Registration, Field::Password) => {
            if value.is_empty() {
                Some("Введите пароль")
            } else if value.chars().count() < PASSWORD_MIN {
                Some("Пароль должен содержать не менее 6 символов")
            } else if form == Form::Registration && !has_mixed_case_and_digit(value) {
                Some("Пароль должен содержать заглавную букву, строчную букву и цифру")
            } else {
                None
            }
        }
        (Form::Registration, Field::Email) => {
            if value.trim().is_empty() {
                Some("Введите email")
            } else if !EMAIL_RE.is_match(value) {
                Some("Некорректный формат email")
            } else {
                None
            }
        }
        (Form::Registration, Field::FirstName) => {
            validate_name(value, "Введите имя", "Имя должно содержать не менее 2 символов")
        }
        (Form::Registration, Field::LastName) => validate_name(
            value,
            "Введите фамилию",
            "Фамилия должна содержать не менее 2 символов",
        ),
        (Form::Registration, Field::Gender) => {
            if value.trim().is_empty() {
                Some("Укажите пол")
            } else {
                None
            }
        }
        (Form::Post, Field::Title) => {
            let len = value.trim().chars().count();
            if len == 0 {
                Some("Введите заголовок")
            } else if len < TITLE_RANGE.0 {
                Some("Заголовок должен содержать не менее 3 символов")
            } else if len > TITLE_RANGE.1 {
                Some("Заголовок не должен превышать 200 символов")
            } else {
                None
            }
        }
        (Form::Post, Field::Content) => {
            let len = value.trim().chars().count();
            if len == 0 {
                Some("Введите текст поста")
            } else if len < CONTENT_RANGE.0 {
                Some("Текст поста должен содержать не менее 10 символов")
            } else if len > CONTENT_RANGE.1 {
                Some("Текст поста не должен превышать 5000 символов")
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Подтверждение пароля должно совпадать с паролем.
pub fn validate_confirm_password(password: &str, confirm: &str) -> Option<&'static str> {
    if confirm.is_empty() {
        Some("Подтвердите пароль")
    } else if confirm != password {
        Some("Пароли не совпадают")
    } else {
        None
    }
}

fn validate_name(
    value: &str,
    empty_message: &'static str,
    short_message: &'static str,
) -> Option<&'static str> {
    if value.trim().is_empty() {
        Some(empty_message)
    } else if value.chars().count() < NAME_MIN {
        Some(short_message)
    } else {
        None
    }
}

fn has_mixed_case_and_digit(value: &str) -> bool {
    value.chars().any(char::is_lowercase)
        && value.chars().any(char::is_uppercase)
        && value.chars().any(|c| c.is_ascii_digit())
}

impl Credentials {
    /// Проверяет форму входа.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.record(
            Field::Username,
            validate_field(Form::Login, Field::Username, &self.username),
        );
        errors.record(
            Field::Password,
            validate_field(Form::Login, Field::Password, &self.password),
        );
        errors.into_result()
    }
}

impl Registration {
    /// Проверяет форму регистрации вместе с подтверждением пароля.
    pub fn validate(&self, confirm_password: &str) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let fields = [
            (Field::Username, self.username.as_str()),
            (Field::Password, self.password.as_str()),
            (Field::FirstName, self.first_name.as_str()),
            (Field::LastName, self.last_name.as_str()),
            (Field::Email, self.email.as_str()),
            (Field::Gender, self.gender.as_str()),
        ];
        for (field, value) in fields {
            errors.record(field, validate_field(Form::Registration, field, value));
        }
        errors.record(
            Field::ConfirmPassword,
            validate_confirm_password(&self.password, confirm_password),
        );
        errors.into_result()
    }
}

impl PostDraft {
    /// Проверяет заголовок и текст и возвращает их без пробелов по краям.
    pub fn validate(&self) -> Result<PostDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.record(
            Field::Title,
            validate_field(Form::Post, Field::Title, &self.title),
        );
        errors.record(
            Field::Content,
            validate_field(Form::Post, Field::Content, &self.content),
        );
        errors.into_result()?;

        Ok(PostDraft {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            username: "new_user1".to_string(),
            password: "Secret1".to_string(),
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            gender: "M".to_string(),
            email: "ivan@example.com".to_string(),
        }
    }

    #[test]
    fn login_username_rules() {
        assert!(validate_field(Form::Login, Field::Username, "   ").is_some());
        assert!(validate_field(Form::Login, Field::Username, "ab").is_some());
        assert!(validate_field(Form::Login, Field::Username, "a.b-c").is_none());
    }

    #[test]
    fn registration_username_restricts_charset() {
        let err = validate_field(Form::Registration, Field::Username, "a.b-c");
        assert!(err.is_some());
        assert!(validate_field(Form::Registration, Field::Username, "user_42").is_none());
    }

    #[test]
    fn registration_password_requires_mixed_case_and_digit() {
        assert!(validate_field(Form::Login, Field::Password, "secret").is_none());
        assert!(validate_field(Form::Registration, Field::Password, "secret").is_some());
        assert!(validate_field(Form::Registration, Field::Password, "Secret").is_some());
        assert!(validate_field(Form::Registration, Field::Password, "Secret1").is_none());
        assert!(validate_field(Form::Registration, Field::Password, "S1a").is_some());
    }

    #[test]
    fn email_shape() {
        assert!(validate_field(Form::Registration, Field::Email, "").is_some());
        assert!(validate_field(Form::Registration, Field::Email, "user@host").is_some());
        assert!(validate_field(Form::Registration, Field::Email, "us er@host.io").is_some());
        assert!(validate_field(Form::Registration, Field::Email, "user@host.io").is_none());
    }

    #[test]
    fn confirm_password_must_match() {
        assert!(validate_confirm_password("Secret1", "").is_some());
        assert!(validate_confirm_password("Secret1", "Secret2").is_some());
        assert!(validate_confirm_password("Secret1", "Secret1").is_none());
    }

    #[test]
    fn post_lengths_count_trimmed_characters() {
        assert!(validate_field(Form::Post, Field::Title, "  ab  ").is_some());
        assert!(validate_field(Form::Post, Field::Title, "Hi!").is_none());
        assert!(validate_field(Form::Post, Field::Title, &"x".repeat(201)).is_some());
        assert!(validate_field(Form::Post, Field::Content, "short").is_some());
        assert!(validate_field(Form::Post, Field::Content, "0123456789").is_none());
        assert!(validate_field(Form::Post, Field::Content, &"x".repeat(5001)).is_some());
    }

    #[test]
    fn fields_outside_the_form_are_valid() {
        assert!(validate_field(Form::Login, Field::Title, "").is_none());
        assert!(validate_field(Form::Post, Field::Username, "").is_none());
    }

    #[test]
    fn post_draft_reports_only_the_failing_field() {
        let draft = PostDraft {
            title: "Hi!".to_string(),
            content: "short".to_string(),
        };

        let errors = draft.validate().expect_err("content is too short");
        assert_eq!(errors.len(), 1);
        assert!(errors.get(Field::Content).is_some());
        assert!(errors.get(Field::Title).is_none());
    }

    #[test]
    fn post_draft_validate_trims_fields() {
        let draft = PostDraft {
            title: "  Title  ".to_string(),
            content: "  long enough content  ".to_string(),
        };

        let normalized = draft.validate().expect("draft is valid");
        assert_eq!(normalized.title, "Title");
        assert_eq!(normalized.content, "long enough content");
    }

    #[test]
    fn registration_collects_all_errors() {
        let mut reg = registration();
        reg.first_name = "I".to_string();
        reg.gender = String::new();

        let errors = reg.validate("other").expect_err("must fail");
        let fields: Vec<Field> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(
            fields,
            vec![Field::ConfirmPassword, Field::FirstName, Field::Gender]
        );
        assert!(registration().validate("Secret1").is_ok());
    }

    #[test]
    fn credentials_validate() {
        let creds = Credentials {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        };
        assert!(creds.validate().is_ok());

        let bad = Credentials {
            username: String::new(),
            password: "123".to_string(),
        };
        assert_eq!(bad.validate().expect_err("must fail").len(), 2);
    }
}
