//! Навигационная панель

use std::sync::Arc;

use tracing::{debug, warn};

use crate::routes::Route;
use crate::state::{AuthStore, CarbonateStore};

/// Ссылка навигации
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub route: Route,
    pub label: String,
}

impl NavLink {
    fn to(route: Route) -> Self {
        Self {
            route,
            label: route.label().to_string(),
        }
    }
}

/// Правая часть панели
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView {
    Anonymous {
        login: NavLink,
    },
    Authenticated {
        greeting: String,
        profile: NavLink,
        logout_label: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavbarView {
    pub brand: NavLink,
    pub links: Vec<NavLink>,
    pub session: SessionView,
}

/// Навигационная панель
pub struct Navbar {
    auth: Arc<AuthStore>,
    carbonates: Arc<CarbonateStore>,
    was_authenticated: bool,
}

impl Navbar {
    pub fn new(auth: Arc<AuthStore>, carbonates: Arc<CarbonateStore>) -> Self {
        Self {
            auth,
            carbonates,
            was_authenticated: false,
        }
    }

    /// Отреагировать на смену сессии. Профиль и сводка по черновику
    /// загружаются только при входе, а не на каждый вызов.
    /// Возвращает `true`, если загрузка была запущена.
    pub async fn refresh(&mut self) -> bool {
        let is_authenticated = self.auth.snapshot().is_authenticated;
        let entered = is_authenticated && !self.was_authenticated;
        self.was_authenticated = is_authenticated;

        if !entered {
            return false;
        }

        debug!("Session started, prefetching profile and current draft");
        let (profile, current) = tokio::join!(
            self.auth.fetch_profile(),
            self.carbonates.fetch_current_carbonate_info()
        );
        if let Err(err) = profile {
            warn!(error = %err, "Profile prefetch failed");
        }
        if let Err(err) = current {
            warn!(error = %err, "Current draft prefetch failed");
        }
        true
    }

    /// Выйти и перейти на страницу входа
    pub async fn logout(&mut self) -> Route {
        if let Err(err) = self.auth.logout().await {
            warn!(error = %err, "Logout failed");
        }
        self.was_authenticated = false;
        Route::Login
    }

    pub fn view(&self) -> NavbarView {
        let state = self.auth.snapshot();

        let mut links = vec![NavLink::to(Route::Acids)];
        if state.is_authenticated {
            links.push(NavLink::to(Route::CarbonateList));
        }

        let session = if state.is_authenticated {
            let login = state.user.as_ref().map(|u| u.login.as_str()).unwrap_or_default();
            SessionView::Authenticated {
                greeting: format!("Привет, {}", login),
                profile: NavLink {
                    route: Route::Profile,
                    label: login.to_string(),
                },
                logout_label: "Выход",
            }
        } else {
            SessionView::Anonymous {
                login: NavLink::to(Route::Login),
            }
        };

        NavbarView {
            brand: NavLink {
                route: Route::Home,
                label: "⌂ Домой".to_string(),
            },
            links,
            session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::models::{CurrentCarbonateInfo, Role};
    use crate::testing::{FakeApi, user};

    fn navbar(api: &Arc<FakeApi>) -> Navbar {
        let bus = Arc::new(EventBus::new());
        let auth = Arc::new(AuthStore::new(api.clone(), bus.clone()));
        let carbonates = Arc::new(CarbonateStore::new(api.clone(), bus));
        Navbar::new(auth, carbonates)
    }

    #[tokio::test]
    async fn anonymous_sees_catalog_and_login() {
        let api = Arc::new(FakeApi::new());
        let mut nav = navbar(&api);

        assert!(!nav.refresh().await);
        let view = nav.view();
        assert_eq!(view.links, vec![NavLink::to(Route::Acids)]);
        assert_eq!(
            view.session,
            SessionView::Anonymous {
                login: NavLink::to(Route::Login)
            }
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn prefetch_runs_once_per_login() {
        let api = Arc::new(FakeApi::new());
        api.set_user(user("ann", Role::User));
        api.set_current(CurrentCarbonateInfo {
            carbonate_id: Some(9),
            acid_count: Some(2),
        });
        let mut nav = navbar(&api);

        nav.auth.login("ann", "pw").await.unwrap();
        assert!(nav.refresh().await);
        assert!(!nav.refresh().await);

        assert_eq!(api.calls_of("profile"), 1);
        assert_eq!(api.calls_of("current_carbonate"), 1);
        assert_eq!(nav.carbonates.snapshot().current_carbonate_id, Some(9));

        let view = nav.view();
        assert_eq!(
            view.links,
            vec![NavLink::to(Route::Acids), NavLink::to(Route::CarbonateList)]
        );
        let SessionView::Authenticated { greeting, profile, .. } = view.session else {
            panic!("expected authenticated session");
        };
        assert_eq!(greeting, "Привет, ann");
        assert_eq!(profile.route, Route::Profile);
    }

    #[tokio::test]
    async fn logout_clears_carbonates_and_goes_to_login() {
        let api = Arc::new(FakeApi::new());
        api.set_user(user("ann", Role::User));
        api.set_current(CurrentCarbonateInfo {
            carbonate_id: Some(9),
            acid_count: Some(2),
        });
        let mut nav = navbar(&api);
        nav.auth.login("ann", "pw").await.unwrap();
        nav.refresh().await;

        api.fail_next(crate::error::ApiError::Transport("offline".into()));
        assert_eq!(nav.logout().await, Route::Login);

        assert_eq!(nav.carbonates.snapshot().current_carbonate_id, None);
        assert_eq!(nav.carbonates.snapshot().current_acid_count, 0);
        assert!(matches!(nav.view().session, SessionView::Anonymous { .. }));

        // Logging in again prefetches again
        nav.auth.login("ann", "pw").await.unwrap();
        assert!(nav.refresh().await);
    }
}
