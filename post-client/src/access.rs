//! Правила доступа, по которым виды блокируют элементы управления.
//!
//! Backend проверяет права сам; здесь только то, что нужно интерфейсу.

use crate::models::{Post, Role};
use crate::store::SessionState;

/// Вошедший пользователь является администратором.
pub fn is_admin(session: &SessionState) -> bool {
    session.role() == Some(Role::Admin)
}

/// Администратор может удалять и менять роль любого пользователя, кроме себя.
pub fn can_modify_user(session: &SessionState, target_id: i64) -> bool {
    is_admin(session) && session.subject_id() != Some(target_id)
}

/// Пост может редактировать или удалять его автор либо администратор.
pub fn can_edit_post(session: &SessionState, post: &Post) -> bool {
    match session.subject_id() {
        Some(id) => id == post.author.id || is_admin(session),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{Author, LoginOutcome, User};
    use crate::store::SessionAction;

    fn session_for(id: i64, role: Role) -> SessionState {
        let mut session = SessionState::default();
        session.reduce(SessionAction::LoginSucceeded(LoginOutcome {
            token: "T".to_string(),
            user: Some(User {
                id,
                username: format!("user{id}"),
                email: format!("user{id}@example.com"),
                first_name: String::new(),
                last_name: String::new(),
                gender: None,
                role,
            }),
        }));
        session
    }

    fn post_by(author_id: i64) -> Post {
        Post {
            id: 1,
            title: "Title".to_string(),
            content: "Some content here".to_string(),
            author: Author {
                id: author_id,
                username: "author".to_string(),
                first_name: String::new(),
                last_name: String::new(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_cannot_modify_own_account() {
        let session = session_for(1, Role::Admin);
        assert!(!can_modify_user(&session, 1));
        assert!(can_modify_user(&session, 2));
    }

    #[test]
    fn regular_user_cannot_modify_anyone() {
        let session = session_for(3, Role::User);
        assert!(!can_modify_user(&session, 4));
        assert!(!is_admin(&session));
    }

    #[test]
    fn post_editable_by_author_or_admin() {
        assert!(can_edit_post(&session_for(5, Role::User), &post_by(5)));
        assert!(!can_edit_post(&session_for(6, Role::User), &post_by(5)));
        assert!(can_edit_post(&session_for(1, Role::Admin), &post_by(5)));
        assert!(!can_edit_post(&SessionState::default(), &post_by(5)));
    }
}
