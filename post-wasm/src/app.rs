use leptos::prelude::*;
use post_client::{SessionState, access};

use crate::actions;
use crate::components::auth_panel::{LoginForm, RegisterForm};
use crate::components::posts_panel::{EditPost, PostDetail, PostsPanel};
use crate::components::toasts::Toasts;
use crate::components::users_panel::UsersPanel;
use crate::state::AppState;
use crate::view_model::Route;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    actions::check_auth_status(state);

    let authenticated = move || state.session.with(SessionState::is_authenticated);
    let user_text = move || {
        state.session.with(|s| {
            s.authenticated_user()
                .map(|u| format!("{} ({})", u.username, u.role))
                .unwrap_or_else(|| "гость".to_string())
        })
    };

    let page = move || match state.route.get() {
        Route::Posts => view! { <PostsPanel state=state /> }.into_any(),
        Route::PostDetail(id) => view! { <PostDetail state=state id=id /> }.into_any(),
        Route::EditPost(id) => view! { <EditPost state=state id=id /> }.into_any(),
        Route::Login => view! { <LoginForm state=state /> }.into_any(),
        Route::Register => view! { <RegisterForm state=state /> }.into_any(),
        Route::Users => view! { <UsersPanel state=state /> }.into_any(),
    };

    view! {
        <main class="page">
            <header class="container">
                <h1>"Блог"</h1>
                <nav>
                    <button on:click=move |_| state.navigate(Route::Posts)>"Посты"</button>
                    <Show when=move || state.session.with(access::is_admin)>
                        <button on:click=move |_| state.navigate(Route::Users)>
                            "Пользователи"
                        </button>
                    </Show>
                    <Show
                        when=authenticated
                        fallback=move || {
                            view! {
                                <button on:click=move |_| state.navigate(Route::Login)>"Войти"</button>
                                <button on:click=move |_| state.navigate(Route::Register)>
                                    "Регистрация"
                                </button>
                            }
                        }
                    >
                        <button on:click=move |_| actions::logout(state)>"Выйти"</button>
                    </Show>
                </nav>
                <p>"Пользователь: " {user_text}</p>
                <p class="route-title">{move || state.route.get().title()}</p>
            </header>

            <section class="container">{page}</section>

            <Toasts state=state />
        </main>
    }
}
