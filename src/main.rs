use log::{debug, info, warn};
use simplelog::*;
use std::sync::Arc;

use tictactoe_server::config::Config;
use tictactoe_server::store::{GameStore, MemoryStore, MySqlStore, UserStore};
use tictactoe_server::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {

    // A .env file is optional, real environment variables win
    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;

    // set up tracing facility
    let _ = SimpleLogger::init(config.log_level, simplelog::Config::default());
    info!("Starting..");

    // Pick the store: MySQL when a database url is configured, memory otherwise
    let (games, users): (Arc<dyn GameStore>, Arc<dyn UserStore>) = match &config.database_url {
        Some(database_url) => {
            debug!("connecting to the database");
            let store = Arc::new(MySqlStore::connect(database_url).await?);
            let games: Arc<dyn GameStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            (games, users)
        }
        None => {
            warn!("$DATABASE_URL is not set, games and users are kept in memory only");
            let store = Arc::new(MemoryStore::new());
            let games: Arc<dyn GameStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            (games, users)
        }
    };

    let state = AppState::new(&config, games, users);
    let app = app(state);

    // Start the server
    debug!("Listening on {}", config.bind_address);
    axum::Server::bind(&config.bind_address)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
