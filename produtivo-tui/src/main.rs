//! Produtivo TUI - terminal dashboard for products, features and roadmaps.
//!
//! Products own features; scheduled features are laid out as bars on a
//! zoomable roadmap timeline with full CRUD against the REST backend.

mod api;
mod app;
mod config;
mod error;
mod forms;
mod logging;
mod models;
mod roadmap;
mod theme;
mod timeline;
mod ui;

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use api::{ApiClient, ApiCommand, ApiMessage, EntityType};
use app::App;
use config::{Cli, Config};
use timeline::TimelineState;

/// Frame pacing for the event loop (approximately 30 FPS)
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install().ok();

    let config = Config::from(Cli::parse());
    let _log_guard = logging::init(&config.log_dir)?;
    tracing::info!(api_url = %config.api_url, zoom = %config.zoom, "starting");

    let result = run_tui(config).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "exited with error");
    }
    result
}

/// Run the TUI application
async fn run_tui(config: Config) -> Result<()> {
    // Build the client before touching the terminal so bad config fails cleanly
    let api_client = ApiClient::new(&config.api_url, &config.api_key, config.timeout)?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Create communication channels
    let (api_tx, mut api_rx) = mpsc::channel::<ApiMessage>(32);
    let (cmd_tx, cmd_rx) = mpsc::channel::<ApiCommand>(32);

    let api_task = tokio::spawn(run_api_worker(api_client, api_tx, cmd_rx));

    // Send initial refresh command
    cmd_tx.send(ApiCommand::RefreshAll).await.ok();

    let mut app = App::new(TimelineState::new(
        config.zoom,
        config.reference_date,
        config.px_per_column,
    ));

    let result = run_event_loop(&mut terminal, &mut app, &mut api_rx, &cmd_tx).await;

    // Cleanup
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    cmd_tx.send(ApiCommand::Shutdown).await.ok();
    if tokio::time::timeout(Duration::from_secs(1), api_task)
        .await
        .is_err()
    {
        tracing::warn!("API worker did not stop in time");
    }

    result
}

/// Send a loaded collection, or the error that prevented it
async fn send_loaded<T>(
    tx: &mpsc::Sender<ApiMessage>,
    result: Result<T>,
    loaded: impl FnOnce(T) -> ApiMessage,
) {
    let msg = match result {
        Ok(data) => loaded(data),
        Err(e) => {
            tracing::warn!(error = %e, "refresh failed");
            ApiMessage::Error(e.to_string())
        }
    };
    tx.send(msg).await.ok();
}

/// Report a mutation outcome; returns whether it succeeded
async fn send_mutation(
    tx: &mpsc::Sender<ApiMessage>,
    action: &str,
    entity: EntityType,
    result: Result<uuid::Uuid>,
    done: impl FnOnce(EntityType, uuid::Uuid) -> ApiMessage,
) -> bool {
    match result {
        Ok(id) => {
            tracing::info!(%entity, %id, action, "mutation succeeded");
            tx.send(done(entity, id)).await.ok();
            true
        }
        Err(e) => {
            tracing::warn!(%entity, action, error = %e, "mutation failed");
            tx.send(ApiMessage::Error(format!(
                "{} {} failed: {}",
                action,
                entity.to_string().to_lowercase(),
                e
            )))
            .await
            .ok();
            false
        }
    }
}

async fn refresh(client: &ApiClient, tx: &mpsc::Sender<ApiMessage>, cmd: &ApiCommand) {
    match cmd {
        ApiCommand::RefreshAll => {
            let connected = client.health_check().await.unwrap_or(false);
            tx.send(ApiMessage::ConnectionStatus(connected)).await.ok();

            if connected {
                let (products, features) =
                    tokio::join!(client.fetch_all_products(), client.fetch_all_features());
                send_loaded(tx, products, ApiMessage::ProductsLoaded).await;
                send_loaded(tx, features, ApiMessage::FeaturesLoaded).await;
            } else {
                tracing::warn!(base_url = client.base_url(), "API unreachable");
                tx.send(ApiMessage::Error("Cannot connect to API".to_string()))
                    .await
                    .ok();
            }
        }
        ApiCommand::RefreshProducts => {
            send_loaded(tx, client.fetch_all_products().await, ApiMessage::ProductsLoaded).await;
        }
        ApiCommand::RefreshFeatures => {
            send_loaded(tx, client.fetch_all_features().await, ApiMessage::FeaturesLoaded).await;
        }
        _ => {}
    }
}

/// Run the API worker task
async fn run_api_worker(
    client: ApiClient,
    tx: mpsc::Sender<ApiMessage>,
    mut rx: mpsc::Receiver<ApiCommand>,
) {
    while let Some(cmd) = rx.recv().await {
        tracing::debug!(?cmd, "api command");

        let succeeded = match &cmd {
            ApiCommand::RefreshAll | ApiCommand::RefreshProducts | ApiCommand::RefreshFeatures => {
                refresh(&client, &tx, &cmd).await;
                false
            }
            ApiCommand::Shutdown => break,

            // Products
            ApiCommand::CreateProduct(dto) => {
                let result = client.create_product(dto).await.map(|p| p.id);
                send_mutation(&tx, "Create", EntityType::Product, result, ApiMessage::Created).await
            }
            ApiCommand::UpdateProduct(id, dto) => {
                let result = client.update_product(*id, dto).await.map(|p| p.id);
                send_mutation(&tx, "Update", EntityType::Product, result, ApiMessage::Updated).await
            }
            ApiCommand::DeleteProduct(id) => {
                let result = client.delete_product(*id).await;
                send_mutation(&tx, "Delete", EntityType::Product, result, ApiMessage::Deleted).await
            }

            // Features
            ApiCommand::CreateFeature(dto) => {
                let result = client.create_feature(dto).await.map(|f| f.id);
                send_mutation(&tx, "Create", EntityType::Feature, result, ApiMessage::Created).await
            }
            ApiCommand::UpdateFeature(id, dto) => {
                let result = client.update_feature(*id, dto).await.map(|f| f.id);
                send_mutation(&tx, "Update", EntityType::Feature, result, ApiMessage::Updated).await
            }
            ApiCommand::UpdateFeatureStatus(id, status) => {
                let result = client.update_feature_status(*id, *status).await.map(|f| f.id);
                send_mutation(&tx, "Update", EntityType::Feature, result, ApiMessage::Updated).await
            }
            ApiCommand::DeleteFeature(id) => {
                let result = client.delete_feature(*id).await;
                send_mutation(&tx, "Delete", EntityType::Feature, result, ApiMessage::Deleted).await
            }
        };

        // Reload whatever the mutation touched
        if succeeded {
            if let Some(follow_up) = cmd.refresh_after() {
                refresh(&client, &tx, &follow_up).await;
            }
        }
    }

    tracing::debug!("API worker stopped");
}

/// Run the main event loop
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    api_rx: &mut mpsc::Receiver<ApiMessage>,
    cmd_tx: &mpsc::Sender<ApiCommand>,
) -> Result<()> {
    loop {
        app.tick();

        terminal.draw(|frame| ui::render(frame, app))?;

        // Check for API messages (non-blocking)
        while let Ok(msg) = api_rx.try_recv() {
            app.handle_api_message(msg);
        }

        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    if let Some(cmd) = app.handle_key(key) {
                        cmd_tx.send(cmd).await.ok();
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
