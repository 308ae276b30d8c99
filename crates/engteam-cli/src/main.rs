use anyhow::Result;
use clap::{Parser, Subcommand};
use engteam_catalog::FsMaterializer;
use engteam_cli::commands::{self, init, list, status, sync};
use engteam_cli::prompts::{DialoguerUi, PresetUi, SelectionUi};
use engteam_cli::{Config, Context, Outcome};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "engineering-team")]
#[command(version)]
#[command(about = "Configure agents and skills for your projects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog root (overrides config and ENGINEERING_TEAM_CATALOG)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Select agents and skills and install them into a project
    Init {
        /// Project directory (defaults to the current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Reconfigure without asking
        #[arg(short, long)]
        force: bool,

        /// Agents to install, skipping the prompt
        #[arg(long, value_delimiter = ',')]
        agents: Option<Vec<String>>,

        /// Skills to install, skipping the prompt
        #[arg(long, value_delimiter = ',')]
        skills: Option<Vec<String>>,

        /// Stack items as type:name[@version]
        #[arg(long, value_delimiter = ',')]
        stack: Option<Vec<String>>,

        /// Answer yes to every question
        #[arg(short, long)]
        yes: bool,
    },

    /// Re-copy installed agents and skills from the catalog
    Sync {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// List the agents and skills available in the catalog
    List {
        #[arg(short, long)]
        json: bool,

        /// Show only agents
        #[arg(short, long, conflicts_with = "skills")]
        agents: bool,

        /// Show only skills
        #[arg(short, long)]
        skills: bool,
    },

    /// Show installed agents, skills and stack for a project
    Status {
        #[arg(short, long)]
        dir: Option<PathBuf>,

        #[arg(short, long)]
        json: bool,
    },
}

async fn dispatch(cli: Cli, ctx: &Context) -> Result<Outcome> {
    let materializer = FsMaterializer::new();

    match cli.command {
        Commands::Init {
            dir,
            force,
            agents,
            skills,
            stack,
            yes,
        } => {
            let project_dir = commands::resolve_project_dir(dir.as_deref())?;
            let options = init::InitOptions {
                force,
                stack: stack.as_deref().map(init::parse_stack).transpose()?,
            };

            let preset = agents.is_some() || skills.is_some() || yes;
            let ui: Box<dyn SelectionUi> = if preset {
                Box::new(PresetUi {
                    agents,
                    skills,
                    assume_yes: yes,
                })
            } else {
                Box::new(DialoguerUi)
            };

            init::run(ctx, &project_dir, &options, ui.as_ref(), &materializer).await
        }
        Commands::Sync { dir } => {
            let project_dir = commands::resolve_project_dir(dir.as_deref())?;
            sync::run(ctx, &project_dir, &materializer).await
        }
        Commands::List {
            json,
            agents,
            skills,
        } => list::run(
            ctx,
            list::ListFilter {
                agents_only: agents,
                skills_only: skills,
            },
            json,
        ),
        Commands::Status { dir, json } => {
            let project_dir = commands::resolve_project_dir(dir.as_deref())?;
            status::run(ctx, &project_dir, json).await
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let config = Config::load()?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    engteam_logging::init_logging(level, config.logging.format)?;

    let ctx = Context::new(&config, cli.catalog.as_deref());
    debug!("Catalog root: {:?}", ctx.catalog_root);

    dispatch(cli, &ctx).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(Outcome::Completed) => ExitCode::SUCCESS,
        Ok(Outcome::Aborted) => {
            println!("{}", "Aborted.".yellow());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}
