// Box score keeper entry point.
//
// Startup sequence:
// 1. Load config (copying defaults/ into config/ on first run)
// 2. Initialize tracing (log to file, not terminal)
// 3. Initialize AppState
// 4. Create mpsc channels
// 5. Spawn app logic task
// 6. Run the console until the user quits
// 7. Cleanup on exit

use boxscore::app;
use boxscore::config::{self, LoggingConfig};
use boxscore::console;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;
    info!("Box score keeper starting up");
    info!(
        "Config loaded: {} default players, auto-advance {}, start mode {}, exports to {}",
        config.game.default_players.len(),
        config.game.auto_advance,
        config.game.start_mode,
        config.export.dir
    );

    // 3. Initialize AppState
    let app_state = app::AppState::new(config);

    // 4. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    // 5. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 6. Run the console (blocks until quit or stdin closes)
    if let Err(e) = console::run(ui_rx, cmd_tx).await {
        error!("Console error: {}", e);
    }

    // 7. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Box score keeper shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file so output never mixes with the prompt.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join(&logging.dir);
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("boxscore.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&logging.filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
