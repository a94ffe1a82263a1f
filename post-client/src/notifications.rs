//! Очередь всплывающих уведомлений.
//!
//! Очередь сама по себе чистая: добавление, закрытие и истечение записей.
//! Таймеры живут снаружи: на хосте это [`Toaster`] поверх `tokio::time`,
//! в браузере таймауты окна.

use std::fmt;
use std::time::Duration;

/// Время жизни уведомления по умолчанию.
pub const DEFAULT_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Идентификатор уведомления, уникальный в пределах очереди.
pub struct NotificationId(u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Важность уведомления.
pub enum Severity {
    /// Операция прошла успешно.
    Success,
    /// Операция завершилась ошибкой.
    Error,
    /// Предупреждение.
    Warning,
    /// Информация.
    Info,
}

impl Severity {
    /// Короткая метка для вывода.
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Уведомление в очереди.
pub struct Notification {
    /// Идентификатор.
    pub id: NotificationId,
    /// Текст.
    pub message: String,
    /// Важность.
    pub severity: Severity,
    /// Через сколько уведомление исчезнет само.
    pub ttl: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Очередь уведомлений в порядке добавления.
pub struct NotificationQueue {
    entries: Vec<Notification>,
    next_id: u64,
}

impl NotificationQueue {
    /// Пустая очередь.
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет уведомление со временем жизни по умолчанию.
    pub fn enqueue(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
    ) -> Option<NotificationId> {
        self.enqueue_with_ttl(message, severity, DEFAULT_TTL)
    }

    /// Добавляет уведомление.
    ///
    /// Если в очереди уже есть запись с тем же текстом и важностью, новая молча
    /// отбрасывается и возвращается `None`.
    pub fn enqueue_with_ttl(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        ttl: Duration,
    ) -> Option<NotificationId> {
        let message = message.into();
        if self
            .entries
            .iter()
            .any(|entry| entry.severity == severity && entry.message == message)
        {
            return None;
        }

        self.next_id += 1;
        let id = NotificationId(self.next_id);
        self.entries.push(Notification {
            id,
            message,
            severity,
            ttl,
        });
        Some(id)
    }

    /// Закрывает уведомление пользователем.
    pub fn dismiss(&mut self, id: NotificationId) -> Option<Notification> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Убирает уведомление по истечении его времени жизни.
    pub fn expire(&mut self, id: NotificationId) -> Option<Notification> {
        self.dismiss(id)
    }

    /// Очищает очередь и возвращает идентификаторы удалённых записей.
    pub fn clear(&mut self) -> Vec<NotificationId> {
        self.entries.drain(..).map(|entry| entry.id).collect()
    }

    /// Записи в порядке добавления.
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Есть ли запись с таким идентификатором.
    pub fn contains(&self, id: NotificationId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Количество записей.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Очередь пуста.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(feature = "native")]
pub use toaster::Toaster;

#[cfg(feature = "native")]
mod toaster {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
    use std::time::Duration;

    use tokio::task::AbortHandle;
    use tracing::debug;

    use super::{DEFAULT_TTL, Notification, NotificationId, NotificationQueue, Severity};

    #[derive(Debug, Default)]
    struct Inner {
        queue: NotificationQueue,
        timers: HashMap<NotificationId, AbortHandle>,
    }

    #[derive(Debug, Clone, Default)]
    /// Очередь уведомлений с обратным отсчётом на `tokio::time`.
    ///
    /// Каждое принятое уведомление запускает свою задачу-таймер; закрытие или
    /// очистка отменяют соответствующие таймеры. Методы добавления нужно
    /// вызывать внутри runtime tokio.
    pub struct Toaster {
        inner: Arc<Mutex<Inner>>,
    }

    impl Toaster {
        /// Пустая очередь.
        pub fn new() -> Self {
            Self::default()
        }

        fn lock(&self) -> MutexGuard<'_, Inner> {
            self.inner.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Добавляет уведомление со временем жизни по умолчанию.
        pub fn notify(&self, message: impl Into<String>, severity: Severity) -> Option<NotificationId> {
            self.notify_with_ttl(message, severity, DEFAULT_TTL)
        }

        /// Добавляет уведомление и запускает его обратный отсчёт.
        pub fn notify_with_ttl(
            &self,
            message: impl Into<String>,
            severity: Severity,
            ttl: Duration,
        ) -> Option<NotificationId> {
            let mut inner = self.lock();
            let id = inner.queue.enqueue_with_ttl(message, severity, ttl)?;

            let weak = Arc::downgrade(&self.inner);
            let task = tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let mut inner = shared.lock().unwrap_or_else(PoisonError::into_inner);
                inner.timers.remove(&id);
                if inner.queue.expire(id).is_some() {
                    debug!(%id, "notification expired");
                }
            });
            inner.timers.insert(id, task.abort_handle());
            Some(id)
        }

        /// Закрывает уведомление и отменяет его таймер. Остальные таймеры не трогаются.
        pub fn dismiss(&self, id: NotificationId) -> bool {
            let mut inner = self.lock();
            if let Some(timer) = inner.timers.remove(&id) {
                timer.abort();
            }
            inner.queue.dismiss(id).is_some()
        }

        /// Очищает очередь и отменяет все таймеры.
        pub fn clear(&self) {
            let mut inner = self.lock();
            for (_, timer) in inner.timers.drain() {
                timer.abort();
            }
            inner.queue.clear();
        }

        /// Текущие уведомления в порядке добавления.
        pub fn snapshot(&self) -> Vec<Notification> {
            self.lock().queue.entries().to_vec()
        }

        /// Сколько таймеров ещё не сработало.
        pub fn pending_timers(&self) -> usize {
            self.lock().timers.len()
        }
    }
}
