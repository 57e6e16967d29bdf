use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use migrat::catalog::{CatalogProvider, FsCatalog};
use migrat::planner::{PlanOptions, Planner};
use migrat::plugins::PluginRegistry;
use migrat::project::{Project, DEFAULT_CONFIG_FILE};
use migrat::render::{self, OutputFormat};
use migrat::state::StateRecord;
use migrat::{common, MigrationId};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Log level: trace, debug, info (default), warn or error; logs go to stderr
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default project config
    Init {
        #[clap(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Overwrite an existing config
        #[clap(short, long)]
        force: bool,
    },
    /// List the migrations found for the project
    List {
        #[clap(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Plan which migrations an `up` run would execute or skip
    Plan {
        #[clap(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Last migration to include
        #[clap(short, long)]
        to: Option<String>,
        /// Override the global state snapshot path
        #[clap(long)]
        global_state: Option<PathBuf>,
        /// Override the local state snapshot path
        #[clap(long)]
        local_state: Option<PathBuf>,
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Show which state scope caused each skip
        #[clap(short, long)]
        explain: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Init { config, force } => {
            if config.exists() && !force {
                bail!(
                    "{} already exists, use --force to overwrite",
                    config.display()
                );
            }
            info!("Initializing project config: {}", config.display());
            let yaml = Project::default_config_yaml()?;
            common::write_string_to_file(&config, &yaml)?;
        }
        Commands::List { config, format } => {
            let project = Project::load(&config)?;
            let catalog = FsCatalog.list_migrations(&project).await?;
            print!("{}", render::render_catalog(&catalog, format)?);
        }
        Commands::Plan {
            config,
            to,
            global_state,
            local_state,
            format,
            explain,
        } => {
            let project = Project::load(&config)?;
            let global = StateRecord::load(
                global_state
                    .as_deref()
                    .unwrap_or_else(|| project.global_state_path()),
            )?;
            let local = StateRecord::load(
                local_state
                    .as_deref()
                    .unwrap_or_else(|| project.local_state_path()),
            )?;
            let options = PlanOptions {
                to: to.map(MigrationId::from),
            };
            let plugins = PluginRegistry::new();
            let planner = Planner::new(FsCatalog);

            let output = if explain {
                let entries = planner
                    .explain(&project, &plugins, &global, &local, &options)
                    .await?;
                render::render_explained(&entries, format)?
            } else {
                let runlist = planner
                    .plan(&project, &plugins, &global, &local, &options)
                    .await?;
                render::render_runlist(&runlist, format)?
            };
            print!("{}", output);
        }
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("migrat={}", log_level)))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
