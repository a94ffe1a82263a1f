use leptos::prelude::*;
use post_client::{Role, access};

use crate::actions;
use crate::components::confirmed;
use crate::state::AppState;

#[component]
pub(crate) fn UsersPanel(state: AppState) -> impl IntoView {
    actions::fetch_users(state);

    let term = RwSignal::new(String::new());
    let role_filter = RwSignal::new(None::<Role>);
    let loading = move || state.users.with(|s| s.loading);

    let visible = move || {
        let term = term.get();
        let role = role_filter.get();
        state.users.with(|s| {
            s.filtered(&term, role)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    view! {
        <h2>"Пользователи"</h2>
        <p>
            {move || {
                state.users.with(|s| {
                    format!(
                        "Всего: {}, администраторов: {}",
                        s.users.len(),
                        s.count_by_role(Role::Admin),
                    )
                })
            }}
        </p>
        <div class="toolbar">
            <input
                placeholder="Поиск по имени или email"
                on:input=move |ev| term.set(event_target_value(&ev))
            />
            <select on:change=move |ev| role_filter.set(event_target_value(&ev).parse().ok())>
                <option value="">"Все роли"</option>
                <option value="USER">"USER"</option>
                <option value="ADMIN">"ADMIN"</option>
            </select>
        </div>
        <table class="users">
            <thead>
                <tr>
                    <th>"ID"</th>
                    <th>"Логин"</th>
                    <th>"Email"</th>
                    <th>"Имя"</th>
                    <th>"Роль"</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>
                <For
                    each=visible
                    key=|user| (user.id, user.role)
                    children=move |user| {
                        let id = user.id;
                        let role = user.role;
                        // Собственную запись администратор не меняет и не удаляет.
                        let locked = move || {
                            loading() || !state.session.with(|s| access::can_modify_user(s, id))
                        };
                        view! {
                            <tr>
                                <td>{id}</td>
                                <td>{user.username.clone()}</td>
                                <td>{user.email.clone()}</td>
                                <td>{user.full_name()}</td>
                                <td>
                                    <select
                                        disabled=locked
                                        on:change=move |ev| {
                                            if let Ok(next) = event_target_value(&ev).parse::<Role>() {
                                                if next != role {
                                                    actions::update_user_role(state, id, next);
                                                }
                                            }
                                        }
                                    >
                                        <option value="USER" selected=role == Role::User>"USER"</option>
                                        <option value="ADMIN" selected=role == Role::Admin>"ADMIN"</option>
                                    </select>
                                </td>
                                <td>
                                    <button
                                        disabled=locked
                                        on:click=move |_| {
                                            if confirmed("Удалить этого пользователя?") {
                                                actions::delete_user(state, id);
                                            }
                                        }
                                    >
                                        "Удалить"
                                    </button>
                                </td>
                            </tr>
                        }
                    }
                />
            </tbody>
        </table>
    }
}
