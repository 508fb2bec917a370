mod config;
mod http;

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};
use platform_obs::{ObsConfig, init_tracing};
use tracing::info;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "payroll-server", version, about = "Payroll and invoicing back office")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Provision an administrator account. Re-running with the same id is a no-op.
    #[command(name = "seed-admin")]
    SeedAdmin(SeedAdminCommand),
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

#[derive(Args, Debug)]
struct SeedAdminCommand {
    #[arg(long = "admin-id")]
    admin_id: String,
    #[arg(long, default_value = "Administrator")]
    name: String,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => run_server(cmd).await,
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up().await,
            MigrateCommand::Down => migrate_down().await,
        },
        Command::SeedAdmin(cmd) => seed_admin(cmd).await,
    }
}

async fn setup_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::from_env();
    connect(&settings).await.map_err(Into::into)
}

async fn run_server(cmd: ServeCommand) -> Result<()> {
    let config = Arc::new(AppConfig::load()?);
    let pool = setup_pool().await?;
    ensure_migrations(&pool, cmd.allow_dirty).await?;
    let state = AppState { pool, config };
    http::serve((&cmd).into(), state).await
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "pending migrations detected; run `payroll-server migrate up` or pass --allow-dirty"
        );
    }
    Ok(())
}

async fn migrate_up() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::up(&pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::down(&pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}

async fn seed_admin(cmd: SeedAdminCommand) -> Result<()> {
    let pool = setup_pool().await?;
    let created = products_hr::admins::ensure_admin(&pool, &cmd.admin_id, &cmd.name).await?;
    if created {
        info!(admin_id = %cmd.admin_id, "administrator provisioned");
    } else {
        info!(admin_id = %cmd.admin_id, "administrator already present");
    }
    Ok(())
}
