pub(crate) mod auth_panel;
pub(crate) mod posts_panel;
pub(crate) mod toasts;
pub(crate) mod users_panel;

use leptos::prelude::*;
use post_client::{Field, FieldErrors};

/// Подсказка под полем формы, если у поля есть ошибка.
#[component]
pub(crate) fn FieldHint(errors: RwSignal<FieldErrors>, field: Field) -> impl IntoView {
    move || {
        errors
            .with(|errors| errors.get(field))
            .map(|message| view! { <small class="field-error">{message}</small> })
    }
}

/// Спрашивает подтверждение перед необратимым действием. Без `window` считается отказом.
pub(crate) fn confirmed(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}
