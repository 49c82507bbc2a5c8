use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::services::schedule_service::ScheduleService;
use crate::error::StartupError;
use crate::state::AppState;
use crate::infra::repositories::{
    postgres_directory_repo::PostgresDirectoryRepo, postgres_schedule_repo::PostgresScheduleRepo,
    sqlite_directory_repo::SqliteDirectoryRepo, sqlite_schedule_repo::SqliteScheduleRepo,
};

pub async fn bootstrap_state(config: &Config) -> Result<AppState, StartupError> {
    let database_url = &config.database_url;

    if config.is_postgres() {
        info!("Initializing PostgreSQL connection...");

        let opts: PgConnectOptions = database_url.parse()?;
        let opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections.unwrap_or(10))
            .connect_with(opts)
            .await?;

        run_postgres_migrations(&pool).await?;
        Ok(postgres_state(config, pool))
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.db_max_connections.unwrap_or(5))
            .connect_with(opts)
            .await?;

        run_sqlite_migrations(&pool).await?;
        Ok(sqlite_state(config, pool))
    }
}

pub fn postgres_state(config: &Config, pool: PgPool) -> AppState {
    let schedule_service = ScheduleService::new(
        Arc::new(PostgresScheduleRepo::new(pool.clone())),
        Arc::new(PostgresDirectoryRepo::new(pool)),
    );
    AppState {
        config: config.clone(),
        schedule_service: Arc::new(schedule_service),
    }
}

pub fn sqlite_state(config: &Config, pool: SqlitePool) -> AppState {
    let schedule_service = ScheduleService::new(
        Arc::new(SqliteScheduleRepo::new(pool.clone())),
        Arc::new(SqliteDirectoryRepo::new(pool)),
    );
    AppState {
        config: config.clone(),
        schedule_service: Arc::new(schedule_service),
    }
}

async fn run_postgres_migrations(pool: &PgPool) -> Result<(), StartupError> {
    sqlx::migrate!("./migrations/postgres").run(pool).await?;
    Ok(())
}

async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), StartupError> {
    sqlx::migrate!("./migrations/sqlite").run(pool).await?;
    Ok(())
}
