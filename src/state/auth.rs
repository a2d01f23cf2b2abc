//! Сессия пользователя
//!
//! Только то, что нужно страницам: признак входа, профиль и выход.
//! Выход публикует [`AuthEvent::LogoutCompleted`], на который подписаны
//! остальные хранилища.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::AuthApi;
use crate::error::ApiError;
use crate::events::{AuthEvent, EventBus};
use crate::models::User;

/// Состояние сессии
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub error: Option<ApiError>,
}

impl AuthState {
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }
}

/// Хранилище сессии
pub struct AuthStore {
    api: Arc<dyn AuthApi>,
    state: watch::Sender<AuthState>,
    bus: Arc<EventBus>,
}

impl AuthStore {
    pub fn new(api: Arc<dyn AuthApi>, bus: Arc<EventBus>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { api, state, bus }
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Войти по логину и паролю
    pub async fn login(&self, login: &str, password: &str) -> Result<(), ApiError> {
        let response = match self.api.login(login, password).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Login failed");
                self.state.send_modify(|s| s.error = Some(err.clone()));
                return Err(err);
            }
        };

        self.state.send_modify(|s| {
            s.is_authenticated = true;
            s.user = response.user.clone();
            s.error = None;
        });
        info!("Logged in as {}", login);

        self.bus.publish(AuthEvent::LoginCompleted {
            login: login.to_string(),
        });
        Ok(())
    }

    /// Восстановить сессию по уже выданному токену
    pub async fn restore(&self) -> Result<(), ApiError> {
        let user = self.fetch_profile().await?;
        self.state.send_modify(|s| s.is_authenticated = true);
        self.bus.publish(AuthEvent::LoginCompleted { login: user.login });
        Ok(())
    }

    /// Загрузить профиль
    pub async fn fetch_profile(&self) -> Result<User, ApiError> {
        match self.api.profile().await {
            Ok(user) => {
                self.state.send_modify(|s| {
                    s.user = Some(user.clone());
                    s.error = None;
                });
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "Profile fetch failed");
                self.state.send_modify(|s| s.error = Some(err.clone()));
                Err(err)
            }
        }
    }

    /// Выйти. Локальная сессия сбрасывается в любом случае, событие
    /// выхода публикуется после сброса.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.api.logout().await;
        if let Err(err) = &result {
            warn!(error = %err, "Logout request failed, dropping local session anyway");
        }

        self.state.send_modify(|s| {
            s.is_authenticated = false;
            s.user = None;
            s.error = result.as_ref().err().cloned();
        });
        info!("Logged out");

        self.bus.publish(AuthEvent::LogoutCompleted);
        result
    }
}
