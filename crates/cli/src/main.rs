//! `decor` entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser, Subcommand};

use decor_cli::{App, UpdateField};
use decor_infra::StoreConfig;
use decor_infra::config::{DATA_DIR_ENV, REPORT_DIR_ENV};
use decor_inventory::SortMode;

#[derive(Parser)]
#[command(name = "decor")]
#[command(about = "Wedding decor rental inventory")]
#[command(version)]
struct Cli {
    /// Directory holding inventory.csv and deleted_items.csv
    #[arg(long, env = DATA_DIR_ENV, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory reports are saved to (default: Downloads)
    #[arg(long, env = REPORT_DIR_ENV, global = true)]
    report_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level (logs go to stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show active items grouped by type
    List,

    /// Show deleted items
    Deleted,

    /// Add a new item (its item number is assigned automatically)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        quantity: String,
        /// Vases, Table Runners or Greeneries
        #[arg(long = "type")]
        item_type: String,
    },

    /// Change one field of an active item
    #[command(group(ArgGroup::new("field").required(true).multiple(false)))]
    Update {
        item_number: String,
        #[arg(long, group = "field")]
        number: Option<String>,
        /// Moves the item to a new number in the type's range
        #[arg(long = "type", group = "field")]
        item_type: Option<String>,
        #[arg(long, group = "field")]
        name: Option<String>,
        #[arg(long, group = "field")]
        quantity: Option<String>,
    },

    /// Move an active item to the deleted items
    Delete { item_number: String },

    /// Bring deleted items back into the inventory
    Restore {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        item_number: Option<String>,
        #[arg(long)]
        all: bool,
    },

    /// Permanently delete deleted items
    Purge {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        item_number: Option<String>,
        #[arg(long)]
        all: bool,
    },

    /// Generate the inventory report
    Report {
        /// alphabetical, quantity or number
        #[arg(long, default_value = "alphabetical")]
        sort: SortMode,
        /// Print to stdout instead of saving a file
        #[arg(long)]
        print: bool,
    },
}

fn update_field(
    number: Option<String>,
    item_type: Option<String>,
    name: Option<String>,
    quantity: Option<String>,
) -> anyhow::Result<UpdateField> {
    number
        .map(UpdateField::ItemNumber)
        .or_else(|| item_type.map(UpdateField::ItemType))
        .or_else(|| name.map(UpdateField::Name))
        .or_else(|| quantity.map(UpdateField::Quantity))
        .ok_or_else(|| anyhow::anyhow!("choose one of --number, --type, --name or --quantity"))
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let mut config = StoreConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(dir) = cli.report_dir {
        config = config.with_report_dir(dir);
    }
    tracing::debug!(data_dir = %config.data_dir.display(), "opening inventory");

    let mut app = App::open(config, cli.json)?;
    match cli.command {
        Commands::List => app.list(),
        Commands::Deleted => app.deleted(),
        Commands::Create {
            name,
            quantity,
            item_type,
        } => app.create(&name, &quantity, &item_type),
        Commands::Update {
            item_number,
            number,
            item_type,
            name,
            quantity,
        } => {
            let field = update_field(number, item_type, name, quantity)?;
            app.update(&item_number, field)
        }
        Commands::Delete { item_number } => app.delete(&item_number),
        Commands::Restore { all: true, .. } => app.restore_all(),
        Commands::Restore { item_number, .. } => app.restore(item_number.as_deref().unwrap_or_default()),
        Commands::Purge { all: true, .. } => app.purge_all(),
        Commands::Purge { item_number, .. } => app.purge(item_number.as_deref().unwrap_or_default()),
        Commands::Report { sort, print: true } => app.report_text(sort),
        Commands::Report { sort, print: false } => {
            app.save_report(sort, chrono::Local::now().date_naive())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    decor_observability::init_with(if cli.verbose { "debug" } else { "warn" });

    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
