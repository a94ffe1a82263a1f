use leptos::prelude::*;

use crate::state::AppState;
use crate::view_model::toast_class;

#[component]
pub(crate) fn Toasts(state: AppState) -> impl IntoView {
    view! {
        <div class="toast-container">
            <For
                each=move || state.toasts.with(|queue| queue.entries().to_vec())
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div class=toast_class(toast.severity) id=id.to_string()>
                            <span>{toast.message.clone()}</span>
                            <button class="toast-close" on:click=move |_| state.dismiss(id)>
                                "×"
                            </button>
                        </div>
                    }
                }
            />
            <Show when=move || state.toasts.with(|queue| queue.len() > 1)>
                <button class="toast-clear" on:click=move |_| state.clear_toasts()>
                    "Скрыть все"
                </button>
            </Show>
        </div>
    }
}
