use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use resolver::admin::{self, PickSheet};
use resolver::{PickResolver, WikipediaConfig, WikipediaSource, batch};
use storage::Database;
use storage::credentials::hash_password;
use storage::repository::participant::ParticipantRepository;
use storage::repository::season::SeasonRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "deathpool")]
#[command(about = "Deathpool season administration and pick resolution", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://deathpool.db")]
    database_url: String,

    #[arg(long, env = "WIKIPEDIA_API_URL", default_value = "https://en.wikipedia.org/w/api.php")]
    wikipedia_api_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up every unresolved pick of a season
    ResolveBatch {
        #[arg(long)]
        season: i32,

        /// Pause between lookups, in milliseconds
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,
    },
    AddParticipant {
        name: String,
    },
    /// Set or reset a participant's login
    SetPassword {
        #[arg(long)]
        participant: String,

        #[arg(long)]
        username: String,

        #[arg(long, env = "DEATHPOOL_PASSWORD")]
        password: String,
    },
    LockSeason {
        season: i32,
    },
    UnlockSeason {
        season: i32,
    },
    /// Load a JSON draft sheet: { "participant": ["subject", ...] }
    ImportPicks {
        #[arg(long)]
        season: i32,

        file: PathBuf,
    },
    /// Dump participants, seasons and picks as JSON
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "deathpool={},resolver={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = Database::new(&cli.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", cli.database_url))?;
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    match cli.command {
        Commands::ResolveBatch { season, delay_ms } => {
            let source = WikipediaSource::new(WikipediaConfig {
                api_url: cli.wikipedia_api_url,
                ..WikipediaConfig::default()
            })
            .context("Failed to build Wikipedia client")?;
            let resolver = PickResolver::new(db.pool(), &source);
            let report =
                batch::resolve_unresolved(&resolver, season, Duration::from_millis(delay_ms))
                    .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::AddParticipant { name } => {
            let participant = ParticipantRepository::new(db.pool())
                .create(name.trim())
                .await?;
            tracing::info!("✓ Participant {} has id {}", participant.name, participant.id);
        }
        Commands::SetPassword {
            participant,
            username,
            password,
        } => {
            handle_set_password(&db, &participant, &username, &password).await?;
        }
        Commands::LockSeason { season } => {
            SeasonRepository::new(db.pool()).set_picks_locked(season, true).await?;
            tracing::info!("✓ Season {} picks are locked and visible to everyone", season);
        }
        Commands::UnlockSeason { season } => {
            SeasonRepository::new(db.pool()).set_picks_locked(season, false).await?;
            tracing::info!("✓ Season {} picks are open for drafting", season);
        }
        Commands::ImportPicks { season, file } => {
            tracing::info!("Loading draft sheet from: {}", file.display());
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let sheet: PickSheet =
                serde_json::from_str(&content).context("Draft sheet is not valid JSON")?;
            let summary = admin::import_pick_sheet(db.pool(), season, &sheet).await?;
            tracing::info!(
                "✓ Import completed: {} imported, {} skipped",
                summary.imported,
                summary.skipped
            );
        }
        Commands::Export { output } => {
            let dump = admin::export(db.pool()).await?;
            let json = serde_json::to_string_pretty(&dump)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("✓ Exported to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

async fn handle_set_password(
    db: &Database,
    participant: &str,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    if password.len() < 4 {
        bail!("Password must be at least 4 characters");
    }

    let participants = ParticipantRepository::new(db.pool());
    let found = participants
        .find_by_name(participant)
        .await
        .with_context(|| format!("No participant named '{}'", participant))?;
    participants
        .set_credentials(found.id, username.trim(), &hash_password(password)?)
        .await?;

    tracing::info!("✓ Credentials updated for {}", found.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::credentials::verify_password;

    #[tokio::test]
    async fn test_set_password_reports_context() {
        let db = Database::in_memory().await.unwrap();

        let short = handle_set_password(&db, "Jim", "jim", "abc").await.unwrap_err();
        assert!(short.to_string().contains("at least 4 characters"));

        let unknown = handle_set_password(&db, "Jim", "jim", "hunter2")
            .await
            .unwrap_err();
        assert_eq!(unknown.to_string(), "No participant named 'Jim'");
    }

    #[tokio::test]
    async fn test_set_password_stores_verifiable_hash() {
        let db = Database::in_memory().await.unwrap();
        ParticipantRepository::new(db.pool()).create("Jim").await.unwrap();

        handle_set_password(&db, "Jim", " jim ", "hunter2").await.unwrap();

        let jim = ParticipantRepository::new(db.pool())
            .find_by_username("jim")
            .await
            .unwrap();
        let hash = jim.password_hash.unwrap();
        assert!(verify_password("hunter2", &hash));
    }
}
