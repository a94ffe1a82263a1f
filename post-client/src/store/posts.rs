use crate::models::{PageResult, Post, PostQuery};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Кэш постов: одна загруженная страница и «текущий» пост для детального просмотра.
pub struct PostState {
    /// Последняя загруженная страница.
    pub page: PageResult<Post>,
    /// Фильтры, с которыми была запрошена страница.
    pub query: PostQuery,
    /// Пост для детального просмотра или редактирования.
    pub current: Option<Post>,
    /// Запрошенный пост не найден (вид показывает «ничего не найдено»).
    pub current_not_found: bool,
    /// Запрос в полёте.
    pub loading: bool,
    /// Последняя ошибка.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Переходы кэша постов.
pub enum PostAction {
    /// Запрошена страница.
    FetchStarted(PostQuery),
    /// Страница загружена и заменяет кэш целиком.
    PageLoaded(PageResult<Post>),
    /// Запрошен один пост.
    PostRequested,
    /// Загружен пост для детального просмотра.
    PostLoaded(Post),
    /// Пост для детального просмотра не найден.
    PostNotFound,
    /// Пост взят из кэша без запроса (например, для редактирования).
    Selected(Post),
    /// Отправлен запрос создания, обновления или удаления.
    MutationStarted,
    /// Сервер создал пост.
    Created(Post),
    /// Сервер обновил пост.
    Updated(Post),
    /// Сервер удалил пост.
    Deleted(i64),
    /// Запрос завершился ошибкой; кэш не меняется.
    Failed(String),
    /// Сбросить текущий пост.
    ClearCurrent,
    /// Сбросить ошибку.
    ClearError,
}

impl PostState {
    /// Применяет переход.
    pub fn reduce(&mut self, action: PostAction) {
        match action {
            PostAction::FetchStarted(query) => {
                self.query = query;
                self.current_not_found = false;
                self.loading = true;
                self.error = None;
            }
            PostAction::PageLoaded(page) => {
                self.page = page;
                self.loading = false;
            }
            PostAction::PostRequested => {
                self.current_not_found = false;
                self.loading = true;
                self.error = None;
            }
            PostAction::PostLoaded(post) => {
                self.current = Some(post);
                self.current_not_found = false;
                self.loading = false;
            }
            PostAction::PostNotFound => {
                self.current = None;
                self.current_not_found = true;
                self.loading = false;
            }
            PostAction::Selected(post) => {
                self.current = Some(post);
                self.current_not_found = false;
            }
            PostAction::MutationStarted => {
                self.loading = true;
                self.error = None;
            }
            PostAction::Created(post) => {
                self.page.items.insert(0, post);
                // Страница не растёт сверх своего размера: хвост уезжает на следующую.
                let page_size = self.page.page_size as usize;
                if page_size > 0 && self.page.items.len() > page_size {
                    self.page.items.truncate(page_size);
                }
                self.page.total_items += 1;
                self.page.total_pages = self.page.total_pages.max(1);
                self.loading = false;
            }
            PostAction::Updated(post) => {
                if let Some(cached) = self.page.items.iter_mut().find(|p| p.id == post.id) {
                    *cached = post.clone();
                }
                if self.current.as_ref().is_some_and(|current| current.id == post.id) {
                    self.current = Some(post);
                }
                self.loading = false;
            }
            PostAction::Deleted(id) => {
                self.page.items.retain(|p| p.id != id);
                self.page.total_items = self.page.total_items.saturating_sub(1);
                if self.current.as_ref().is_some_and(|current| current.id == id) {
                    self.current = None;
                }
                self.loading = false;
            }
            PostAction::Failed(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            PostAction::ClearCurrent => {
                self.current = None;
                self.current_not_found = false;
            }
            PostAction::ClearError => {
                self.error = None;
            }
        }
    }

    /// Пост из кэша страницы или текущий пост.
    pub fn find(&self, id: i64) -> Option<&Post> {
        self.page
            .items
            .iter()
            .find(|p| p.id == id)
            .or_else(|| self.current.as_ref().filter(|p| p.id == id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::Author;

    fn sample_post(id: i64, title: &str) -> Post {
        let ts = Utc.timestamp_opt(1_757_505_600, 0).single().expect("valid ts");
        Post {
            id,
            title: title.to_string(),
            content: "some long content".to_string(),
            author: Author {
                id: 1,
                username: "admin".to_string(),
                first_name: String::new(),
                last_name: String::new(),
            },
            created_at: ts,
            updated_at: ts,
        }
    }

    fn state_with(ids: &[i64], page_size: u32, total_items: u64) -> PostState {
        let mut state = PostState::default();
        state.reduce(PostAction::PageLoaded(PageResult {
            items: ids.iter().map(|id| sample_post(*id, "t")).collect(),
            page_index: 0,
            page_size,
            total_items,
            total_pages: 3,
        }));
        state
    }

    fn ids(state: &PostState) -> Vec<i64> {
        state.page.items.iter().map(|p| p.id).collect()
    }

    #[test]
    fn delete_removes_entry_and_decrements_total() {
        let mut state = state_with(&[3, 7, 9], 10, 23);
        state.reduce(PostAction::Deleted(7));

        assert_eq!(ids(&state), vec![3, 9]);
        assert_eq!(state.page.total_items, 22);
        assert_eq!(state.page.total_pages, 3);
    }

    #[test]
    fn delete_clears_matching_current_post() {
        let mut state = state_with(&[1], 10, 1);
        state.reduce(PostAction::PostLoaded(sample_post(1, "t")));
        state.reduce(PostAction::Deleted(1));

        assert!(state.current.is_none());
        assert_eq!(state.page.total_items, 0);
    }

    #[test]
    fn page_load_replaces_cache_wholesale() {
        let mut state = state_with(&[1, 2], 10, 2);
        state.reduce(PostAction::FetchStarted(PostQuery::default()));
        assert!(state.loading);

        state.reduce(PostAction::PageLoaded(PageResult {
            items: vec![sample_post(5, "t")],
            page_index: 1,
            page_size: 10,
            total_items: 11,
            total_pages: 2,
        }));
        assert_eq!(ids(&state), vec![5]);
        assert!(!state.loading);
    }

    #[test]
    fn created_post_goes_to_head_and_page_keeps_its_size() {
        let mut state = state_with(&[1, 2], 2, 2);
        state.reduce(PostAction::Created(sample_post(10, "new")));

        assert_eq!(ids(&state), vec![10, 1]);
        assert_eq!(state.page.total_items, 3);
    }

    #[test]
    fn created_post_into_empty_cache() {
        let mut state = PostState::default();
        state.reduce(PostAction::Created(sample_post(10, "new")));

        assert_eq!(ids(&state), vec![10]);
        assert_eq!(state.page.total_pages, 1);
    }

    #[test]
    fn update_replaces_entry_and_matching_current() {
        let mut state = state_with(&[1, 2], 10, 2);
        state.reduce(PostAction::PostLoaded(sample_post(2, "old")));
        state.reduce(PostAction::Updated(sample_post(2, "new")));

        assert_eq!(state.page.items[1].title, "new");
        assert_eq!(state.current.as_ref().map(|p| p.title.as_str()), Some("new"));
        assert_eq!(ids(&state), vec![1, 2]);
    }

    #[test]
    fn update_leaves_unrelated_current_alone() {
        let mut state = state_with(&[1, 2], 10, 2);
        state.reduce(PostAction::PostLoaded(sample_post(1, "keep")));
        state.reduce(PostAction::Updated(sample_post(2, "new")));

        assert_eq!(state.current.as_ref().map(|p| p.title.as_str()), Some("keep"));
    }

    #[test]
    fn failure_keeps_cached_collection() {
        let mut state = state_with(&[1, 2], 10, 2);
        let before = state.page.clone();
        state.reduce(PostAction::MutationStarted);
        state.reduce(PostAction::Failed("boom".to_string()));

        assert_eq!(state.page, before);
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert!(!state.loading);
    }

    #[test]
    fn not_found_is_a_view_state_not_an_error() {
        let mut state = PostState::default();
        state.reduce(PostAction::PostRequested);
        state.reduce(PostAction::PostNotFound);

        assert!(state.current_not_found);
        assert!(state.error.is_none());
        assert!(state.find(1).is_none());
    }

    #[test]
    fn stale_not_found_is_cleared_by_list_fetch_and_selection() {
        let mut state = state_with(&[1, 2], 10, 2);
        state.reduce(PostAction::PostRequested);
        state.reduce(PostAction::PostNotFound);
        assert!(state.current_not_found);

        state.reduce(PostAction::FetchStarted(PostQuery::default()));
        assert!(!state.current_not_found);

        state.reduce(PostAction::PostNotFound);
        let cached = state.find(2).cloned().expect("cached post");
        state.reduce(PostAction::Selected(cached));

        assert!(!state.current_not_found);
        assert_eq!(state.current.as_ref().map(|p| p.id), Some(2));
        assert_eq!(ids(&state), vec![1, 2]);
    }
}
