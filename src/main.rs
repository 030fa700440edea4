use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use usersvc::config::Config;
use usersvc::routes;
use usersvc::state::AppState;
use usersvc::store::{MemoryUserStore, PgUserStore, UserStore};

const MAX_DB_CONNECTIONS: u32 = 10;

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

async fn open_store(config: &Config) -> io::Result<Arc<dyn UserStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(MAX_DB_CONNECTIONS)
                .connect(url)
                .await
                .map_err(startup_error)?;
            let store = PgUserStore::new(pool);
            store.migrate().await.map_err(startup_error)?;
            log::info!("Connected to Postgres, migrations applied");
            Ok(Arc::new(store))
        }
        None => {
            log::warn!("DATABASE_URL is not set, users are kept in memory only");
            Ok(Arc::new(MemoryUserStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let store = open_store(&config).await?;
    let state = AppState::new(store, &config);

    log::info!("Starting usersvc at {}", config.server_url());
    if state.playground_enabled {
        log::info!("GraphiQL available at {}/graphql", config.server_url());
    }

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
