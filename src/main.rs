//! Консольный клиент заявок
//!
//! Входит под учётной записью из окружения, показывает навигацию и
//! следит за списком заявок за сегодня, пока не нажат Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use carbonate_client::api::CarbonateClient;
use carbonate_client::config::Settings;
use carbonate_client::events::EventBus;
use carbonate_client::state::{AuthStore, CarbonateStore};
use carbonate_client::views::{CarbonatesListPage, ListRow, Navbar, SessionView};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env().context("Failed to load settings")?;

    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_target(false)
        .with_thread_ids(false)
        .init();

    info!("Starting carbonate client");
    info!("API: {}", settings.api_base_url);
    info!("Poll interval: {:?}", settings.poll_interval);

    let client = Arc::new(CarbonateClient::new(&settings).context("Failed to create HTTP client")?);
    let bus = Arc::new(EventBus::new());
    let auth = Arc::new(AuthStore::new(client.clone(), bus.clone()));
    let carbonates = Arc::new(CarbonateStore::new(client, bus));

    if let Some((login, password)) = settings.credentials() {
        auth.login(login, password).await.context("Login failed")?;
    } else if settings.api_token.is_some() {
        auth.restore().await.context("Stored token was rejected")?;
    } else {
        warn!("No credentials configured, only public resources are available");
    }

    let mut navbar = Navbar::new(auth.clone(), carbonates.clone());
    navbar.refresh().await;
    print_navbar(&navbar);

    let viewer = auth.snapshot().user;
    let mut page = CarbonatesListPage::new(carbonates.clone(), viewer.as_ref(), settings.poll_interval);
    if let Err(err) = page.mount().await {
        warn!("Initial list fetch failed: {}", err);
    }

    let mut updates = carbonates.subscribe();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = page.view();
                if view.loading {
                    continue;
                }
                info!("{} ({} rows)", view.heading, view.rows.len());
                for row in &view.rows {
                    print_row(row);
                }
                if let Some(message) = view.empty_message {
                    info!("{}", message);
                }
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    page.unmount();
    if auth.snapshot().is_authenticated {
        let route = navbar.logout().await;
        info!("Redirect to {}", route);
    }
    Ok(())
}

fn print_navbar(navbar: &Navbar) {
    let view = navbar.view();
    let links: Vec<&str> = view.links.iter().map(|l| l.label.as_str()).collect();

    match view.session {
        SessionView::Authenticated { greeting, .. } => {
            info!("{} | {} | {}", view.brand.label, links.join(" | "), greeting)
        }
        SessionView::Anonymous { login } => {
            info!("{} | {} | {}", view.brand.label, links.join(" | "), login.label)
        }
    }
}

fn print_row(row: &ListRow) {
    info!(
        "#{} {} {} {} кислот: {} [{}]{}",
        row.id,
        row.date,
        row.creator.as_deref().unwrap_or(""),
        row.mass,
        row.acid_count,
        row.status.label,
        if row.actions.is_empty() { "" } else { " ждёт решения" }
    );
}
