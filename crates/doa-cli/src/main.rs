mod campaign;
mod followers;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "doa-cli")]
#[command(about = "Follower-count and campaign scraping tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Social-network follower counts
    Followers {
        #[command(subcommand)]
        command: FollowersCommands,
    },
    /// Fundraising campaign pages
    Campaign {
        #[command(subcommand)]
        command: CampaignCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[derive(Debug, Subcommand)]
enum FollowersCommands {
    /// Refresh follower counts for every stored link
    Update {
        /// Only refresh links of this platform
        #[arg(long)]
        platform: Option<String>,
        /// List the links that would be refreshed without scraping
        #[arg(long)]
        dry_run: bool,
    },
    /// Extract one follower count and print it without writing
    Check {
        platform: String,
        /// Profile URL or handle
        url: String,
    },
}

#[derive(Debug, Subcommand)]
enum CampaignCommands {
    /// Scrape a Vakinha campaign page and print the snapshot as JSON
    Scrape { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = doa_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    doa_db::health_check(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    doa_db::run_migrations(&pool).await?;
                    println!("migrations applied");
                }
            }
        }
        Some(Commands::Followers { command }) => match command {
            FollowersCommands::Update { platform, dry_run } => {
                let pool = connect(&config).await?;
                followers::run_followers_update(&pool, &config, platform.as_deref(), dry_run)
                    .await?;
            }
            FollowersCommands::Check { platform, url } => {
                followers::run_followers_check(&config, &platform, &url).await;
            }
        },
        Some(Commands::Campaign {
            command: CampaignCommands::Scrape { url },
        }) => campaign::run_campaign_scrape(&config, &url).await?,
        None => println!("doa-cli: no command given; see --help"),
    }

    Ok(())
}

async fn connect(config: &doa_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = doa_db::PoolConfig::from_app_config(config);
    Ok(doa_db::connect_pool(&config.database_url, pool_config).await?)
}
