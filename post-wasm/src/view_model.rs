//! Чистая логика видов, которую можно проверить без браузера.

use post_client::{PageResult, Post, PostQuery, SessionState, Severity, SortDirection, access};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Экран приложения.
pub(crate) enum Route {
    /// Лента постов.
    #[default]
    Posts,
    /// Один пост.
    PostDetail(i64),
    /// Редактирование поста.
    EditPost(i64),
    /// Вход.
    Login,
    /// Регистрация.
    Register,
    /// Админка пользователей.
    Users,
}

impl Route {
    pub(crate) fn title(self) -> &'static str {
        match self {
            Self::Posts => "Посты",
            Self::PostDetail(_) => "Пост",
            Self::EditPost(_) => "Редактирование",
            Self::Login => "Вход",
            Self::Register => "Регистрация",
            Self::Users => "Пользователи",
        }
    }

    /// Экран доступен только вошедшему пользователю.
    pub(crate) fn requires_session(self) -> bool {
        matches!(self, Self::EditPost(_) | Self::Users)
    }

    pub(crate) fn requires_admin(self) -> bool {
        matches!(self, Self::Users)
    }
}

/// Экран, который реально откроется: гость уходит на вход, не-админ в ленту.
pub(crate) fn guard_route(route: Route, session: &SessionState) -> Route {
    if route.requires_session() && !session.is_authenticated() {
        return Route::Login;
    }
    if route.requires_admin() && !access::is_admin(session) {
        return Route::Posts;
    }
    route
}

/// Варианты сортировки в выпадающем списке: значение, подпись, поле, направление.
pub(crate) const SORT_OPTIONS: [(&str, &str, &str, SortDirection); 4] = [
    ("createdAt:desc", "Сначала новые", "createdAt", SortDirection::Desc),
    ("createdAt:asc", "Сначала старые", "createdAt", SortDirection::Asc),
    ("title:asc", "По заголовку (А-Я)", "title", SortDirection::Asc),
    ("title:desc", "По заголовку (Я-А)", "title", SortDirection::Desc),
];

/// Значение выпадающего списка для текущих фильтров.
pub(crate) fn sort_value(query: &PostQuery) -> String {
    format!(
        "{}:{}",
        query.sort_by.as_deref().unwrap_or("createdAt"),
        query.direction.unwrap_or_default().as_str()
    )
}

/// Применяет выбранную сортировку; сбрасывает на первую страницу.
pub(crate) fn with_sort(query: &PostQuery, value: &str) -> PostQuery {
    let (sort_by, direction) = SORT_OPTIONS
        .iter()
        .find(|(option, ..)| *option == value)
        .map(|(_, _, field, direction)| (Some(field.to_string()), Some(*direction)))
        .unwrap_or((None, None));
    PostQuery {
        page: Some(0),
        sort_by,
        direction,
        ..query.clone()
    }
}

/// Переключает фильтр «только мои»; сбрасывает на первую страницу.
pub(crate) fn with_mine(query: &PostQuery, mine: bool) -> PostQuery {
    PostQuery {
        page: Some(0),
        my_posts: mine,
        ..query.clone()
    }
}

/// Соседняя страница, если она есть.
pub(crate) fn neighbour_page(query: &PostQuery, page: &PageResult<Post>, forward: bool) -> Option<PostQuery> {
    let target = if forward {
        page.has_next().then(|| page.page_index + 1)?
    } else {
        page.has_previous().then(|| page.page_index - 1)?
    };
    Some(PostQuery {
        page: Some(target),
        ..query.clone()
    })
}

/// Подпись пагинации, например «Страница 2 из 5».
pub(crate) fn page_label(page: &PageResult<Post>) -> String {
    if page.total_pages == 0 {
        return "Постов пока нет".to_string();
    }
    format!("Страница {} из {}", page.page_index + 1, page.total_pages)
}

/// CSS-класс уведомления.
pub(crate) fn toast_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "toast toast-success",
        Severity::Error => "toast toast-error",
        Severity::Warning => "toast toast-warning",
        Severity::Info => "toast toast-info",
    }
}

/// Обрезает текст поста для карточки в ленте.
pub(crate) fn excerpt(content: &str, limit: usize) -> String {
    if content.chars().count() <= limit {
        return content.to_string();
    }
    let cut: String = content.chars().take(limit).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use post_client::store::SessionAction;
    use post_client::{LoginOutcome, Role, User};

    use super::*;

    fn signed_in(role: Role) -> SessionState {
        let mut session = SessionState::default();
        session.reduce(SessionAction::LoginSucceeded(LoginOutcome {
            token: "T".to_string(),
            user: Some(User {
                id: 3,
                username: "kate".to_string(),
                email: "kate@example.com".to_string(),
                first_name: "Kate".to_string(),
                last_name: "Ivanova".to_string(),
                gender: None,
                role,
            }),
        }));
        session
    }

    fn page(page_index: u32, total_pages: u32) -> PageResult<Post> {
        PageResult {
            items: Vec::new(),
            page_index,
            page_size: 10,
            total_items: u64::from(total_pages) * 10,
            total_pages,
        }
    }

    #[test]
    fn sort_choice_round_trips_through_select_value() {
        let query = with_sort(&PostQuery::default(), "title:asc");
        assert_eq!(query.sort_by.as_deref(), Some("title"));
        assert_eq!(query.direction, Some(SortDirection::Asc));
        assert_eq!(sort_value(&query), "title:asc");
    }

    #[test]
    fn unknown_sort_falls_back_to_backend_default() {
        let query = with_sort(&PostQuery::default(), "views:desc");
        assert!(query.sort_by.is_none());
        assert!(query.direction.is_none());
    }

    #[test]
    fn filters_reset_to_first_page() {
        let query = PostQuery {
            page: Some(3),
            ..PostQuery::default()
        };
        assert_eq!(with_mine(&query, true).page, Some(0));
        assert!(with_mine(&query, true).my_posts);
        assert_eq!(with_sort(&query, "createdAt:asc").page, Some(0));
    }

    #[test]
    fn neighbour_page_respects_bounds() {
        let query = PostQuery::default();
        assert!(neighbour_page(&query, &page(0, 2), false).is_none());
        assert_eq!(
            neighbour_page(&query, &page(0, 2), true).and_then(|q| q.page),
            Some(1)
        );
        assert!(neighbour_page(&query, &page(1, 2), true).is_none());
    }

    #[test]
    fn page_label_for_empty_and_filled_pages() {
        assert_eq!(page_label(&page(0, 0)), "Постов пока нет");
        assert_eq!(page_label(&page(1, 5)), "Страница 2 из 5");
    }

    #[test]
    fn excerpt_cuts_on_char_boundary() {
        assert_eq!(excerpt("короткий", 20), "короткий");
        assert_eq!(excerpt("длинный текст поста", 7), "длинный…");
    }

    #[test]
    fn protected_routes() {
        assert!(Route::Users.requires_session());
        assert!(!Route::PostDetail(1).requires_session());
        assert_eq!(Route::default(), Route::Posts);
    }

    #[test]
    fn users_screen_is_admin_only() {
        let guest = SessionState::default();
        assert_eq!(guard_route(Route::Users, &guest), Route::Login);
        assert_eq!(guard_route(Route::EditPost(4), &guest), Route::Login);
        assert_eq!(guard_route(Route::PostDetail(4), &guest), Route::PostDetail(4));

        let user = signed_in(Role::User);
        assert_eq!(guard_route(Route::Users, &user), Route::Posts);
        assert_eq!(guard_route(Route::EditPost(4), &user), Route::EditPost(4));

        let admin = signed_in(Role::Admin);
        assert_eq!(guard_route(Route::Users, &admin), Route::Users);
    }
}
