pub mod app;
mod config;
pub mod coords;
pub mod display;
pub mod error;
pub mod geometry;
pub mod history;
pub mod logging;
pub mod session;
pub mod storage;
pub mod ui;
pub mod watermark;
pub use config::{load_app_config, AppConfig};
pub use error::{AppError, AppResult};

/// Entrypoint used by the `aquamark` binary.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting Aquamark");

    let mut app = app::App::new();
    app.start()?;

    tracing::info!("editor window closed");
    Ok(())
}
