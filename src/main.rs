use clap::{Parser, Subcommand};
use shelf::config::Config;
use shelf::registry::PackageRegistry;
use shelf::ShelfResult;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Registry of web asset packages")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered packages
    List,
    /// Print the content checksum
    Checksum,
    /// Print the merged manifests as JSON
    Manifests,
    /// Print the bridges of all packages, highest priority first
    Bridges,
    /// Serve one path and print the response body
    Cat {
        /// Request path, e.g. /base1/index.html
        path: String,
        /// Origin of the request
        #[arg(long, default_value = "http://localhost:9090")]
        origin: String,
        /// Value for the Accept-Language header
        #[arg(short, long)]
        locale: Option<String>,
        /// Print the status line and headers first
        #[arg(short, long)]
        include: bool,
    },
}

fn open_registry(config: Option<PathBuf>) -> ShelfResult<PackageRegistry> {
    let config = match config {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    PackageRegistry::new(config)
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = open_registry(cli.config).and_then(|registry| match cli.command {
        Commands::List => cli::list::run(&registry),
        Commands::Checksum => cli::checksum::run(&registry),
        Commands::Manifests => cli::manifests::run(&registry),
        Commands::Bridges => cli::manifests::run_bridges(&registry),
        Commands::Cat {
            path,
            origin,
            locale,
            include,
        } => cli::cat::run(
            &registry,
            cli::cat::CatOptions {
                path,
                origin,
                locale,
                include,
            },
        ),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
