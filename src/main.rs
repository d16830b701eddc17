//! gatherer CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use gatherer::{
    commands::{
        cmd_ingest, cmd_init, cmd_list_records, cmd_show_record, cmd_status, print_ingest_summary,
        print_record, print_record_page, print_status, IngestRequest,
    },
    config::{Config, Credentials},
    db::{ListQuery, RecordDb},
    error::Result,
    models::SourceTag,
    providers::{HeadlinesOptions, NewsOptions, SocialOptions},
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gatherer")]
#[command(version, about = "Ingest news and social posts into a deduplicated store", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize gatherer configuration and database
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Fetch from a provider and store new records
    Ingest {
        #[command(subcommand)]
        source: IngestSource,
    },

    /// Browse stored records
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },

    /// Show system status
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum IngestSource {
    /// Search news articles
    News {
        /// Search query
        query: String,

        /// Article language (ISO 639-1)
        #[arg(short, long)]
        language: Option<String>,

        /// Number of articles to request (1-100)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        page_size: Option<u32>,
    },

    /// Search recent social posts
    Social {
        /// Search query
        query: String,

        /// Number of posts to collect
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page_size: Option<u32>,
    },

    /// Fetch current top news headlines
    Headlines {
        /// Country code
        #[arg(long)]
        country: Option<String>,

        /// Category (e.g. business, technology)
        #[arg(long)]
        category: Option<String>,

        /// Number of articles to request (1-100)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        page_size: Option<u32>,
    },

    /// Fetch a user's latest social posts
    Timeline {
        /// Username, with or without a leading '@'
        username: String,

        /// Number of posts to collect
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page_size: Option<u32>,
    },
}

#[derive(Subcommand)]
enum RecordsAction {
    /// List stored records
    List {
        /// Records to skip
        #[arg(long, default_value = "0")]
        skip: u32,

        /// Maximum records to return (1-1000)
        #[arg(short, long, default_value = "100")]
        limit: u32,

        /// Only list records from this source (news or social)
        #[arg(long)]
        source: Option<SourceTag>,
    },

    /// Show one record
    Show {
        /// Record ID
        id: i64,

        /// Include the raw provider payload
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let (plain, json) = if cli.log_json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();

    // Handle init command specially (doesn't need existing config)
    if let Commands::Init { force } = cli.command {
        return handle_init(cli.config, force).await;
    }

    // Handle completions command (doesn't need config/db)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "gatherer", &mut std::io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = load_config(cli.config.as_deref())?;
    let credentials = Credentials::from_env(&config);
    let db = RecordDb::new(&config.paths.db_file).await?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Ingest { source } => {
            let request = ingest_request(&config, source);
            let summary = cmd_ingest(&config, &credentials, &db, request).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_ingest_summary(&summary);
            }
        }

        Commands::Records { action } => match action {
            RecordsAction::List {
                skip,
                limit,
                source,
            } => {
                let query = ListQuery {
                    skip,
                    limit,
                    source,
                };
                let page = cmd_list_records(&db, &query).await?;

                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&page)?);
                } else {
                    print_record_page(&page);
                }
            }
            RecordsAction::Show { id, raw } => {
                let record = cmd_show_record(&db, id).await?;

                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                } else {
                    print_record(&record);
                    if raw {
                        if let Some(metadata) = record.metadata() {
                            println!("\n{}", serde_json::to_string_pretty(&metadata)?);
                        }
                    }
                }
            }
        },

        Commands::Status => {
            let status = cmd_status(&config, &credentials, &db).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
    }

    Ok(())
}

async fn handle_init(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.map(Config::resolve_config_path);
    let config = cmd_init(config_path, force).await?;

    println!("✓ gatherer initialized successfully");
    println!("  Config: {}", config.paths.config_file.display());
    println!("  Database: {}", config.paths.db_file.display());
    println!("\nNext steps:");
    println!(
        "  1. Set {} and/or {} (a .env file works too)",
        config.news.api_key_env, config.social.bearer_token_env
    );
    println!("  2. Ingest: gatherer ingest news \"rust programming\"");
    println!("  3. Browse: gatherer records list");

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config_path = path
        .map(|p| Config::resolve_config_path(p.to_path_buf()))
        .unwrap_or_else(Config::default_config_path);

    if !config_path.exists() {
        eprintln!(
            "Config file not found: {}\nRun 'gatherer init' first.",
            config_path.display()
        );
        std::process::exit(1);
    }

    Config::load(&config_path)
}

fn ingest_request(config: &Config, source: IngestSource) -> IngestRequest {
    match source {
        IngestSource::News {
            query,
            language,
            page_size,
        } => {
            let mut options = NewsOptions::from_config(&config.news);
            if let Some(language) = language {
                options.language = language;
            }
            if let Some(page_size) = page_size {
                options.page_size = page_size;
            }
            IngestRequest::News { query, options }
        }

        IngestSource::Social { query, page_size } => IngestRequest::Social {
            query,
            options: social_options(config, page_size),
        },

        IngestSource::Headlines {
            country,
            category,
            page_size,
        } => {
            let mut options = HeadlinesOptions::from_config(&config.news);
            if let Some(country) = country {
                options.country = country;
            }
            options.category = category;
            if let Some(page_size) = page_size {
                options.page_size = page_size;
            }
            IngestRequest::Headlines(options)
        }

        IngestSource::Timeline {
            username,
            page_size,
        } => IngestRequest::Timeline {
            username,
            options: social_options(config, page_size),
        },
    }
}

fn social_options(config: &Config, page_size: Option<u32>) -> SocialOptions {
    let mut options = SocialOptions::from_config(&config.social);
    if let Some(page_size) = page_size {
        options.max_results = page_size;
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_bounds() {
        for args in [
            vec!["gatherer", "ingest", "news", "rust", "--page-size", "0"],
            vec!["gatherer", "ingest", "news", "rust", "--page-size", "101"],
            vec!["gatherer", "ingest", "headlines", "--page-size", "0"],
            vec!["gatherer", "ingest", "social", "rust", "--page-size", "0"],
            vec!["gatherer", "ingest", "timeline", "ferris", "--page-size", "0"],
        ] {
            assert!(Cli::try_parse_from(args.clone()).is_err(), "{:?}", args);
        }

        for args in [
            vec!["gatherer", "ingest", "news", "rust", "--page-size", "100"],
            vec!["gatherer", "ingest", "social", "rust", "--page-size", "500"],
            vec!["gatherer", "ingest", "timeline", "ferris", "--page-size", "1"],
        ] {
            assert!(Cli::try_parse_from(args.clone()).is_ok(), "{:?}", args);
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
