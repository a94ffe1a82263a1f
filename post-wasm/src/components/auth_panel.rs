use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use post_client::{Credentials, Field, FieldErrors, Registration, SessionState};

use crate::actions;
use crate::components::FieldHint;
use crate::state::AppState;
use crate::view_model::Route;

#[component]
pub(crate) fn LoginForm(state: AppState) -> impl IntoView {
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let credentials = Credentials {
            username: username.get().trim().to_string(),
            password: password.get(),
        };
        match actions::login(state, credentials) {
            Ok(()) => errors.set(FieldErrors::new()),
            Err(found) => errors.set(found),
        }
    };

    let pending = move || state.session.with(SessionState::is_authenticating);

    view! {
        <h2>"Вход"</h2>
        <Show when=move || state.session.with(|s| s.error.is_some())>
            <div class="error-banner">
                {move || state.session.with(|s| s.error.clone().unwrap_or_default())}
            </div>
        </Show>
        <form on:submit=on_submit>
            <input
                placeholder="Имя пользователя"
                prop:value=move || username.get()
                on:input=move |ev| username.set(event_target_value(&ev))
            />
            <FieldHint errors=errors field=Field::Username />
            <input
                placeholder="Пароль"
                type="password"
                prop:value=move || password.get()
                on:input=move |ev| password.set(event_target_value(&ev))
            />
            <FieldHint errors=errors field=Field::Password />
            <button type="submit" disabled=pending>
                {move || if pending() { "Входим..." } else { "Войти" }}
            </button>
        </form>
        <p>
            "Нет аккаунта? "
            <a href="#" on:click=move |ev| {
                ev.prevent_default();
                state.navigate(Route::Register);
            }>"Зарегистрироваться"</a>
        </p>
    }
}

#[component]
pub(crate) fn RegisterForm(state: AppState) -> impl IntoView {
    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let first_name = RwSignal::new(String::new());
    let last_name = RwSignal::new(String::new());
    let gender = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let registration = Registration {
            username: username.get().trim().to_string(),
            password: password.get(),
            first_name: first_name.get().trim().to_string(),
            last_name: last_name.get().trim().to_string(),
            gender: gender.get(),
            email: email.get().trim().to_string(),
        };
        match actions::register(state, registration, &confirm.get()) {
            Ok(()) => errors.set(FieldErrors::new()),
            Err(found) => errors.set(found),
        }
    };

    let pending = move || state.session.with(|s| s.registering);

    view! {
        <h2>"Регистрация"</h2>
        <form on:submit=on_submit>
            <input
                placeholder="Имя пользователя"
                on:input=move |ev| username.set(event_target_value(&ev))
            />
            <FieldHint errors=errors field=Field::Username />
            <input
                placeholder="Email"
                type="email"
                on:input=move |ev| email.set(event_target_value(&ev))
            />
            <FieldHint errors=errors field=Field::Email />
            <input
                placeholder="Имя"
                on:input=move |ev| first_name.set(event_target_value(&ev))
            />
            <FieldHint errors=errors field=Field::FirstName />
            <input
                placeholder="Фамилия"
                on:input=move |ev| last_name.set(event_target_value(&ev))
            />
            <FieldHint errors=errors field=Field::LastName />
            <select on:change=move |ev| gender.set(event_target_value(&ev))>
                <option value="">"Пол"</option>
                <option value="M">"Мужской"</option>
                <option value="F">"Женский"</option>
            </select>
            <FieldHint errors=errors field=Field::Gender />
            <input
                placeholder="Пароль"
                type="password"
                on:input=move |ev| password.set(event_target_value(&ev))
            />
            <FieldHint errors=errors field=Field::Password />
            <input
                placeholder="Повторите пароль"
                type="password"
                on:input=move |ev| confirm.set(event_target_value(&ev))
            />
            <FieldHint errors=errors field=Field::ConfirmPassword />
            <button type="submit" disabled=pending>"Зарегистрироваться"</button>
        </form>
        <p>
            "Уже есть аккаунт? "
            <a href="#" on:click=move |ev| {
                ev.prevent_default();
                state.navigate(Route::Login);
            }>"Войти"</a>
        </p>
    }
}
