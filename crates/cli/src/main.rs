use anyhow::Context;
use bookshelf_app::{apply_migrations, build_registry, inference_client, AppState, Application};
use bookshelf_db::Database;
use bookshelf_kernel::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bookshelf-cli", version, about = "Operate the bookshelf service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply migrations and serve HTTP until interrupted
    Serve,
    /// Create any missing tables and exit
    Migrate,
    /// Print the effective configuration, secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load bookshelf settings")?;

    match cli.command {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            Application::build(settings).await?.serve().await
        }
        Command::Migrate => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            migrate(settings).await
        }
        Command::Config => {
            print_config(&settings);
            Ok(())
        }
    }
}

async fn migrate(settings: Settings) -> anyhow::Result<()> {
    let db = Database::connect(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("failed to open database {}", settings.database.url))?;

    let state = AppState::new(db.clone(), &settings, inference_client(&settings.inference));
    let registry = build_registry(&state);
    let applied = apply_migrations(&db, &registry).await?;
    db.close().await;

    tracing::info!(applied, "migrations complete");
    println!("applied {applied} migration(s)");
    Ok(())
}

fn print_config(settings: &Settings) {
    let redacted = |set: bool| if set { "<set>" } else { "<unset>" };

    println!("environment        = {:?}", settings.environment);
    println!(
        "server.address     = {}:{}",
        settings.server.host, settings.server.port
    );
    println!("server.timeout_ms  = {}", settings.server.request_timeout_ms);
    println!("database.url       = {}", settings.database.url);
    println!("telemetry.format   = {:?}", settings.telemetry.log_format);
    println!("telemetry.filter   = {}", settings.telemetry.filter);
    println!("auth.cookie_name   = {}", settings.auth.cookie_name);
    println!("auth.session_ttl   = {}s", settings.auth.session_ttl_secs);
    println!("auth.secret_key    = {}", redacted(!settings.auth.secret_key.is_empty()));
    println!("inference.base_url = {}", settings.inference.base_url);
    println!("inference.model    = {}", settings.inference.model);
    println!("inference.api_key  = {}", redacted(settings.inference.api_key.is_some()));
}
