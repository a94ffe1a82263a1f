use crate::models::{Role, User};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Список пользователей для админки. Хранится целиком, без пагинации.
pub struct UserState {
    /// Пользователи.
    pub users: Vec<User>,
    /// Запрос в полёте.
    pub loading: bool,
    /// Последняя ошибка.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Переходы списка пользователей.
pub enum UserAction {
    /// Запрошен список.
    FetchStarted,
    /// Список загружен.
    Loaded(Vec<User>),
    /// Отправлен запрос удаления или смены роли.
    MutationStarted,
    /// Пользователь удалён.
    Deleted(i64),
    /// Роль изменена. Если сервер вернул пользователя, запись заменяется им целиком.
    RoleChanged {
        /// Идентификатор пользователя.
        id: i64,
        /// Новая роль.
        role: Role,
        /// Ответ сервера.
        user: Option<User>,
    },
    /// Запрос завершился ошибкой; список не меняется.
    Failed(String),
    /// Сбросить ошибку.
    ClearError,
}

impl UserState {
    /// Применяет переход.
    pub fn reduce(&mut self, action: UserAction) {
        match action {
            UserAction::FetchStarted | UserAction::MutationStarted => {
                self.loading = true;
                self.error = None;
            }
            UserAction::Loaded(users) => {
                self.users = users;
                self.loading = false;
            }
            UserAction::Deleted(id) => {
                self.users.retain(|user| user.id != id);
                self.loading = false;
            }
            UserAction::RoleChanged { id, role, user } => {
                if let Some(existing) = self.users.iter_mut().find(|u| u.id == id) {
                    match user {
                        Some(updated) => *existing = updated,
                        None => existing.role = role,
                    }
                }
                self.loading = false;
            }
            UserAction::Failed(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            UserAction::ClearError => {
                self.error = None;
            }
        }
    }

    /// Сколько пользователей с данной ролью.
    pub fn count_by_role(&self, role: Role) -> usize {
        self.users.iter().filter(|user| user.role == role).count()
    }

    /// Пользователи, у которых логин, email или имя содержат `term` (без учёта регистра)
    /// и, если задана, совпадает роль.
    pub fn filtered(&self, term: &str, role: Option<Role>) -> Vec<&User> {
        let term = term.trim().to_lowercase();
        self.users
            .iter()
            .filter(|user| role.is_none_or(|r| user.role == r))
            .filter(|user| {
                term.is_empty()
                    || user.username.to_lowercase().contains(&term)
                    || user.email.to_lowercase().contains(&term)
                    || user.full_name().to_lowercase().contains(&term)
            })
            .collect()
    }
}
