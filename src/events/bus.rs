//! Шина событий между хранилищами
//!
//! Обработчики вызываются синхронно в задаче, которая опубликовала
//! событие, в порядке подписки. Так сброс состояния заявок завершается
//! до того, как `logout` вернёт управление.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

/// События сессии
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Вход выполнен
    LoginCompleted { login: String },
    /// Выход завершён
    LogoutCompleted,
}

/// Идентификатор подписки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

/// Синхронная шина событий
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<(SubscriptionId, Handler)>>,
    next_id: AtomicU64,
    events_published: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Подписаться на все события
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        match self.handlers.write() {
            Ok(mut handlers) => handlers.push((id, Arc::new(handler))),
            Err(_) => warn!("Event bus lock poisoned, subscription dropped"),
        }

        debug!(subscription = id.0, "New subscription created");
        id
    }

    /// Отписаться; возвращает `false`, если подписки уже нет
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut handlers) = self.handlers.write() else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        before != handlers.len()
    }

    /// Опубликовать событие; возвращает число вызванных обработчиков
    pub fn publish(&self, event: AuthEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        // Snapshot so a handler may subscribe or unsubscribe without deadlocking
        let handlers: Vec<Handler> = match self.handlers.read() {
            Ok(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
            Err(_) => {
                warn!(event = ?event, "Event bus lock poisoned, event dropped");
                return 0;
            }
        };

        for handler in &handlers {
            handler(&event);
        }

        debug!(event = ?event, receivers = handlers.len(), "Event published");
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().map(|h| h.len()).unwrap_or(0)
    }

    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
