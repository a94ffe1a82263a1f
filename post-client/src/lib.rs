//! Клиентская библиотека для работы с REST API блога.
//!
//! Состоит из нескольких слоёв:
//! - `BackendApi` и его HTTP-реализация `HttpTransport` (`reqwest`, только на хосте);
//! - контейнеры состояния (`PostClient` со срезами сессии, постов и пользователей);
//! - очередь уведомлений с дедупликацией и автоудалением;
//! - проверка форм и правила доступа для интерфейса.
//!
//! Сборка без фичи `native` пригодна для `wasm32`: транспорт там свой,
//! а разбор ответов общий (модуль `wire`).
#![warn(missing_docs)]

pub mod access;
mod api;
mod credentials;
mod error;
#[cfg(feature = "native")]
mod http_client;
mod models;
pub mod notifications;
pub mod store;
pub mod validation;
pub mod wire;

pub use api::BackendApi;
pub use credentials::{CredentialStore, MemoryCredentialStore, parse_token};
#[cfg(feature = "native")]
pub use credentials::FileCredentialStore;
pub use error::{ClientError, ClientResult, GENERIC_FAILURE};
#[cfg(feature = "native")]
pub use http_client::{DEFAULT_BASE_URL, HttpTransport, TransportConfig, UnauthorizedHook};
pub use models::{
    Author, Credentials, DEFAULT_PAGE_SIZE, LoginOutcome, PageResult, Post, PostDraft, PostQuery,
    Registration, Role, RoleChange, SortDirection, User,
};
#[cfg(feature = "native")]
pub use notifications::Toaster;
pub use notifications::{DEFAULT_TTL, Notification, NotificationId, NotificationQueue, Severity};
pub use store::{
    Action, PostClient, PostState, SessionState, SessionStatus, UserState,
};
pub use validation::{Field, FieldErrors, Form};
