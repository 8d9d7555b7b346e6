mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, contact::ContactArgs, dashboard::DashboardSubcommand,
    projects::ProjectsSubcommand, wizard::WizardSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "certify",
    about = "Net-zero certification intake: project wizard, dashboard and catalog",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .certify/)
    #[arg(long, global = true, env = "CERTIFY_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize certify in the current directory
    Init,

    /// Step through the project-creation wizard
    Wizard {
        #[command(subcommand)]
        subcommand: WizardSubcommand,
    },

    /// View and edit the project dashboard
    Dashboard {
        #[command(subcommand)]
        subcommand: DashboardSubcommand,
    },

    /// Browse the project catalog
    Projects {
        #[command(subcommand)]
        subcommand: ProjectsSubcommand,
    },

    /// Send the contact form
    Contact(ContactArgs),

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Contact(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Wizard { subcommand } => cmd::wizard::run(&root, subcommand, cli.json),
        Commands::Dashboard { subcommand } => cmd::dashboard::run(&root, subcommand, cli.json),
        Commands::Projects { subcommand } => cmd::projects::run(subcommand, cli.json),
        Commands::Contact(args) => cmd::contact::run(&root, args, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
