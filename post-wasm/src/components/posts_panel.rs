use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use post_client::store::PostAction;
use post_client::{Field, FieldErrors, PostDraft, PostState, SessionState, access};

use crate::actions;
use crate::components::{FieldHint, confirmed};
use crate::state::AppState;
use crate::view_model::{self, Route, SORT_OPTIONS};

const EXCERPT_LEN: usize = 200;

#[component]
pub(crate) fn PostsPanel(state: AppState) -> impl IntoView {
    actions::fetch_posts(state, state.posts.with_untracked(|s| s.query.clone()));

    let query = move || state.posts.with(|s| s.query.clone());
    let authenticated = move || state.session.with(SessionState::is_authenticated);
    let loading = move || state.posts.with(|s| s.loading);

    let on_sort = move |ev| {
        let next = view_model::with_sort(&query(), &event_target_value(&ev));
        actions::fetch_posts(state, next);
    };
    let on_mine = move |ev| {
        let next = view_model::with_mine(&query(), event_target_checked(&ev));
        actions::fetch_posts(state, next);
    };
    let go_page = move |forward: bool| {
        let next = state
            .posts
            .with_untracked(|s| view_model::neighbour_page(&s.query, &s.page, forward));
        if let Some(next) = next {
            actions::fetch_posts(state, next);
        }
    };

    view! {
        <h2>"Посты"</h2>
        <div class="toolbar">
            <select on:change=on_sort prop:value=move || view_model::sort_value(&query())>
                {SORT_OPTIONS
                    .iter()
                    .map(|(value, label, ..)| view! { <option value=*value>{*label}</option> })
                    .collect_view()}
            </select>
            <Show when=authenticated>
                <label>
                    <input
                        type="checkbox"
                        prop:checked=move || query().my_posts
                        on:change=on_mine
                    />
                    " Только мои"
                </label>
            </Show>
            <button on:click=move |_| actions::fetch_posts(state, query()) disabled=loading>
                "Обновить"
            </button>
        </div>

        <Show when=authenticated>
            <CreatePostForm state=state />
        </Show>

        <Show
            when=move || state.posts.with(|s| !s.page.is_empty())
            fallback=move || view! { <p class="empty">"Постов не найдено"</p> }
        >
            <ul class="posts">
                <For
                    each=move || state.posts.with(|s| s.page.items.clone())
                    key=|post| (post.id, post.updated_at)
                    children=move |post| {
                        let id = post.id;
                        let editable = {
                            let post = post.clone();
                            move || state.session.with(|s| access::can_edit_post(s, &post))
                        };
                        view! {
                            <li class="post-card">
                                <a href="#" on:click=move |ev| {
                                    ev.prevent_default();
                                    state.navigate(Route::PostDetail(id));
                                }>
                                    <strong>{post.title.clone()}</strong>
                                </a>
                                <p>{view_model::excerpt(&post.content, EXCERPT_LEN)}</p>
                                <small>
                                    {format!(
                                        "{} · {}",
                                        post.author.username,
                                        post.created_at.format("%d.%m.%Y %H:%M"),
                                    )}
                                </small>
                                <Show when=editable.clone()>
                                    <PostControls state=state id=id />
                                </Show>
                            </li>
                        }
                    }
                />
            </ul>
        </Show>

        <div class="pager">
            <button
                on:click=move |_| go_page(false)
                disabled=move || loading() || state.posts.with(|s| !s.page.has_previous())
            >
                "Назад"
            </button>
            <span>{move || state.posts.with(|s| view_model::page_label(&s.page))}</span>
            <button
                on:click=move |_| go_page(true)
                disabled=move || loading() || state.posts.with(|s| !s.page.has_next())
            >
                "Вперёд"
            </button>
        </div>
    }
}

#[component]
fn PostControls(state: AppState, id: i64) -> impl IntoView {
    let loading = move || state.posts.with(|s| s.loading);
    view! {
        <div class="post-controls">
            <button on:click=move |_| state.navigate(Route::EditPost(id)) disabled=loading>
                "Редактировать"
            </button>
            <button
                on:click=move |_| {
                    if confirmed("Удалить этот пост?") {
                        actions::delete_post(state, id);
                    }
                }
                disabled=loading
            >
                "Удалить"
            </button>
        </div>
    }
}

#[component]
fn CreatePostForm(state: AppState) -> impl IntoView {
    let title = RwSignal::new(String::new());
    let content = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let draft = PostDraft {
            title: title.get(),
            content: content.get(),
        };
        match actions::create_post(state, draft) {
            Ok(()) => {
                errors.set(FieldErrors::new());
                title.set(String::new());
                content.set(String::new());
            }
            Err(found) => errors.set(found),
        }
    };

    view! {
        <h3>"Новый пост"</h3>
        <form on:submit=on_submit>
            <input
                placeholder="Заголовок"
                prop:value=move || title.get()
                on:input=move |ev| title.set(event_target_value(&ev))
            />
            <FieldHint errors=errors field=Field::Title />
            <textarea
                placeholder="Текст поста"
                prop:value=move || content.get()
                on:input=move |ev| content.set(event_target_value(&ev))
            ></textarea>
            <FieldHint errors=errors field=Field::Content />
            <button type="submit" disabled=move || state.posts.with(|s| s.loading)>
                "Опубликовать"
            </button>
        </form>
    }
}

#[component]
pub(crate) fn PostDetail(state: AppState, id: i64) -> impl IntoView {
    actions::fetch_post(state, id);

    let current = move || {
        state
            .posts
            .with(|s| s.current.clone().filter(|post| post.id == id))
    };

    view! {
        <a href="#" on:click=move |ev| {
            ev.prevent_default();
            state.post_action(PostAction::ClearCurrent);
            state.navigate(Route::Posts);
        }>"← К списку"</a>
        {move || {
            if state.posts.with(|s| s.current_not_found) {
                return view! { <p class="empty">"Пост не найден"</p> }.into_any();
            }
            let Some(post) = current() else {
                return view! { <p>"Загрузка..."</p> }.into_any();
            };
            let editable = state.session.with(|s| access::can_edit_post(s, &post));
            view! {
                <article>
                    <h2>{post.title.clone()}</h2>
                    <small>
                        {format!(
                            "{} {} (@{}) · обновлён {}",
                            post.author.first_name,
                            post.author.last_name,
                            post.author.username,
                            post.updated_at.format("%d.%m.%Y %H:%M"),
                        )}
                    </small>
                    <p class="post-content">{post.content.clone()}</p>
                    <Show when=move || editable>
                        <PostControls state=state id=id />
                    </Show>
                </article>
            }
            .into_any()
        }}
    }
}

#[component]
pub(crate) fn EditPost(state: AppState, id: i64) -> impl IntoView {
    match state.posts.with_untracked(|s| s.find(id).cloned()) {
        Some(post) => state.post_action(PostAction::Selected(post)),
        None => actions::fetch_post(state, id),
    }

    let title = RwSignal::new(String::new());
    let content = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());
    let filled = RwSignal::new(false);

    // Поля заполняются один раз, когда пост появился в кэше.
    Effect::new(move |_| {
        if filled.get_untracked() {
            return;
        }
        if let Some(post) = state.posts.with(|s| s.find(id).cloned()) {
            title.set(post.title);
            content.set(post.content);
            filled.set(true);
        }
    });

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let draft = PostDraft {
            title: title.get(),
            content: content.get(),
        };
        match actions::update_post(state, id, draft) {
            Ok(()) => errors.set(FieldErrors::new()),
            Err(found) => errors.set(found),
        }
    };

    view! {
        <h2>"Редактирование"</h2>
        <Show
            when=move || !state.posts.with(|s: &PostState| s.current_not_found)
            fallback=|| view! { <p class="empty">"Пост не найден"</p> }
        >
            <form on:submit=on_submit>
                <input
                    prop:value=move || title.get()
                    on:input=move |ev| title.set(event_target_value(&ev))
                />
                <FieldHint errors=errors field=Field::Title />
                <textarea
                    prop:value=move || content.get()
                    on:input=move |ev| content.set(event_target_value(&ev))
                ></textarea>
                <FieldHint errors=errors field=Field::Content />
                <button type="submit" disabled=move || state.posts.with(|s| s.loading)>
                    "Сохранить"
                </button>
                <button
                    type="button"
                    on:click=move |_| state.navigate(Route::PostDetail(id))
                >
                    "Отмена"
                </button>
            </form>
        </Show>
    }
}
