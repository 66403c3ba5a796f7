//! CLI entry point for igctl.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use igkit::Direction;
use igkit_cli::commands::{self, OpenOrder, RunOptions};
use igkit_cli::config::Config;

#[derive(Parser)]
#[command(name = "igctl")]
#[command(about = "Validated order entry for the IG trading API")]
#[command(version)]
struct Cli {
    /// Path to igctl.toml
    #[arg(long, default_value = "igctl.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and show the account
    Status,

    /// Show open positions and working orders
    Positions,

    /// Show the dealing rules of a market
    Rules {
        /// Market epic, e.g. IX.D.FTSE.DAILY.IP
        epic: String,
    },

    /// Search markets by name or epic
    Search { term: String },

    /// Validate and open a market position
    Open(OpenArgs),

    /// Close a position by the deal reference it was opened with
    Close {
        deal_reference: String,

        /// Partial close size (default: whole position)
        #[arg(long)]
        size: Option<f64>,
    },

    /// List watchlists, or the markets of one
    Watchlists { name: Option<String> },
}

#[derive(Args)]
struct OpenArgs {
    #[arg(long)]
    epic: String,

    /// BUY or SELL
    #[arg(long)]
    direction: Direction,

    #[arg(long)]
    size: f64,

    #[arg(long)]
    limit_distance: Option<f64>,

    #[arg(long)]
    limit_level: Option<f64>,

    #[arg(long)]
    stop_distance: Option<f64>,

    #[arg(long)]
    stop_level: Option<f64>,

    /// Make the stop trailing, moving in steps of this many points
    #[arg(long)]
    trailing_increment: Option<f64>,

    /// Deal reference to submit under (default: generated)
    #[arg(long)]
    reference: Option<String>,

    /// Validate without submitting
    #[arg(long)]
    dry_run: bool,

    /// Skip confirmation prompt
    #[arg(long)]
    force: bool,
}

impl OpenArgs {
    fn split(self) -> (OpenOrder, RunOptions) {
        let order = OpenOrder {
            epic: self.epic,
            direction: Some(self.direction),
            size: self.size,
            limit_distance: self.limit_distance,
            limit_level: self.limit_level,
            stop_distance: self.stop_distance,
            stop_level: self.stop_level,
            trailing_increment: self.trailing_increment,
            deal_reference: self.reference,
        };
        let opts = RunOptions {
            dry_run: self.dry_run,
            force: self.force,
        };
        (order, opts)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Status => commands::check_status(&config),
        Command::Positions => commands::show_positions(&config),
        Command::Rules { epic } => commands::show_rules(&config, &epic),
        Command::Search { term } => commands::search(&config, &term),
        Command::Open(args) => {
            let (order, opts) = args.split();
            commands::open(&config, &order, opts)
        }
        Command::Close {
            deal_reference,
            size,
        } => commands::close(&config, &deal_reference, size),
        Command::Watchlists { name } => commands::show_watchlists(&config, name.as_deref()),
    };

    if let Err(e) = result {
        if e.is_validation() {
            eprintln!("\nRejected: {e}");
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(e.exit_code());
    }
}
