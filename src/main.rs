//! Binary entry point: resolve settings, start logging, open the database, and
//! drive the Ratatui event loop until the user exits.
use anyhow::Context;
use medical_agenda::{run_app, App, AppConfig, Store};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    config.init_logging()?;
    info!(db = %config.db_path.display(), "medical agenda starting");

    let store = Store::open(&config.db_path).context("failed to open agenda database")?;
    let mut app = App::new(store)?;
    let result = run_app(&mut app);

    info!("medical agenda stopped");
    result
}
