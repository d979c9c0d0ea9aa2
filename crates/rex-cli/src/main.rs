use clap::{Parser, Subcommand};
use rex::{
    commands::{
        config::{self, ConfigAction},
        extract::{self, ExtractArgs},
    },
    GlobalOpts,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Recipe example manifest extractor",
    long_about = "Rex scans a corpus of recipe tests, mines the before/after examples \
                  embedded in them, and keeps the examples.yml documentation manifests \
                  in sync."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract examples from a test corpus and synchronize its manifests
    Extract {
        /// Corpus root to scan (defaults to the configured corpus-root, then
        /// the current directory)
        path: Option<String>,
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Exit non-zero if any manifest is out of date (CI gate)
        #[arg(long, conflicts_with = "dry_run")]
        check: bool,
        /// Scan test files sequentially
        #[arg(long)]
        no_parallel: bool,
    },
    /// Configure the rex tool
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let verbosity = cli.global.verbosity_level();
    init_tracing(verbosity);
    if let Err(e) = rex_logger::init_with_verbosity(verbosity) {
        eprintln!("warning: {}", e);
    }

    let code = match cli.command {
        Commands::Extract {
            path,
            dry_run,
            check,
            no_parallel,
        } => extract::handle_extract(
            ExtractArgs {
                path,
                dry_run,
                check,
                no_parallel,
            },
            cli.global,
        ),
        Commands::Config { action } => {
            config::handle_config(action, cli.global);
            0
        }
    };

    std::process::exit(code);
}
