use clap::{Args, Parser, Subcommand};

use crate::{config, utils};

#[derive(Args, Debug, Clone)]
pub struct RunMigrationsArgs {
    /// File name under `migrations/`, e.g. `create_tables.sql`
    #[arg(short, long)]
    file: String,
}

#[derive(Args, Debug, Clone)]
pub struct CreateAdminArgs {
    #[arg(short, long)]
    username: String,
    #[arg(short, long)]
    password: String,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    RunMigrations(RunMigrationsArgs),
    CreateAdmin(CreateAdminArgs),
}

/// Operator tasks for the clinic database
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Action,
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        let db_pool = utils::setup_sqlite_db_pool(config::app_config()?.is_prod()).await?;

        match &self.action {
            Action::RunMigrations(RunMigrationsArgs { file }) => {
                utils::run_migrations(&db_pool, file).await
            }
            Action::CreateAdmin(CreateAdminArgs { username, password }) => {
                utils::create_admin(&db_pool, username, password)
                    .await
                    .map(|_| ())
            }
        }
    }
}
