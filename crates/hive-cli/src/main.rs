mod config;
mod plan_cmd;
mod validate_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use hive_core::executor::ContextType;

use config::{ConfigFile, HiveConfig};

#[derive(Parser)]
#[command(name = "hive", about = "Agent task planning and benchmark scenario validation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a hive config file with every setting at its default
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print the planning prompt for a goal without calling a model
    Prompt {
        /// Natural-language goal to decompose
        goal: String,
        /// Agent roster TOML file
        #[arg(long)]
        agents: PathBuf,
    },
    /// Decompose a goal into agent tasks
    Plan {
        /// Natural-language goal to decompose
        goal: String,
        /// Agent roster TOML file
        #[arg(long)]
        agents: PathBuf,
        /// Model identifier (overrides HIVE_MODEL_ID and the config file)
        #[arg(long)]
        model: Option<String>,
        /// Parse a previously captured model reply instead of calling the model
        #[arg(long)]
        reply_file: Option<PathBuf>,
        /// Save the goal and raw reply to this file (.txt is appended if missing)
        #[arg(long)]
        save_plan: Option<PathBuf>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
        /// Execute the plan after generating it
        #[arg(long)]
        run: bool,
        /// Which earlier results each task sees when run: none, selected, or all
        #[arg(long, requires = "run")]
        context: Option<ContextType>,
    },
    /// Validate benchmark scenario files and directories
    Validate {
        /// JSON/JSONL files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Descend into subdirectories
        #[arg(long)]
        recursive: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Execute the `hive init` command: write config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let path = config::save_config(&ConfigFile::with_defaults())?;
    println!("Config written to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(force)?;
        }
        Commands::Prompt { goal, agents } => {
            let resolved = HiveConfig::resolve(None)?;
            plan_cmd::run_prompt(&goal, &agents, &resolved)?;
        }
        Commands::Plan {
            goal,
            agents,
            model,
            reply_file,
            save_plan,
            json,
            run,
            context,
        } => {
            let resolved = HiveConfig::resolve(model.as_deref())?;
            let options = plan_cmd::PlanOptions {
                goal,
                agents,
                reply_file,
                save_plan,
                json,
                run,
                context,
            };
            plan_cmd::run_plan(options, &resolved).await?;
        }
        Commands::Validate {
            paths,
            recursive,
            json,
        } => {
            let resolved = HiveConfig::resolve(None)?;
            let clean = validate_cmd::run_validate(&paths, recursive || resolved.recursive, json)?;
            if !clean {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
