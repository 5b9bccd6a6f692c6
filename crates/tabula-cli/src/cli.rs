//! `tabula` - inspect and edit table files from the terminal
//!
//! Reads a JSON table file, runs it through the same store, filter, sort
//! and edit machinery as the interactive grid, and prints the result.

mod args;
mod commands;
mod json_backend;
mod logging;
mod render;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabula_core::ColumnType;
use tabula_store::TabulaSettings;

use crate::commands::ShowOptions;
use crate::logging::LoggingConfig;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect, query and edit dynamic table files")]
#[command(long_about = "tabula - dynamic table files from the terminal\n\n\
    Examples:\n\
      tabula show tasks.json --filter 'status:equals:todo' --sort 'due:asc'\n\
      tabula show tasks.json --view Open --search parser\n\
      tabula validate tasks.json\n\
      tabula convert tasks.json --column estimate --to number --write\n\
      tabula set tasks.json --row r1 --column status done --write")]
struct Cli {
    /// Log level for tabula crates (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "warn", env = "TABULA_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Also write JSON logs to the tabula log directory
    #[arg(long, global = true)]
    log_file: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE", env = "TABULA_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rows of a table
    Show {
        /// Table file
        file: PathBuf,

        /// Apply a saved view, by id or name
        #[arg(long)]
        view: Option<String>,

        /// Case-insensitive search across text and select columns
        #[arg(short, long)]
        search: Option<String>,

        /// Filter as COLUMN:OPERATOR[:VALUE]; repeat to combine
        #[arg(short, long, value_name = "FILTER", action = clap::ArgAction::Append)]
        filter: Vec<String>,

        /// Sort as COLUMN[:asc|desc]; repeat for secondary keys
        #[arg(long, value_name = "SORT", action = clap::ArgAction::Append)]
        sort: Vec<String>,

        /// Print at most this many rows
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Check every stored cell against its column
    Validate {
        /// Table file
        file: PathBuf,
    },

    /// Change a column's type, converting every value
    Convert {
        /// Table file
        file: PathBuf,

        /// Column id or name
        #[arg(short, long)]
        column: String,

        /// Target type
        #[arg(short, long, value_parser = parse_column_type)]
        to: ColumnType,

        /// Save the converted table; without it the conversion is only checked
        #[arg(short, long)]
        write: bool,
    },

    /// Edit one cell
    Set {
        /// Table file
        file: PathBuf,

        /// Row id
        #[arg(short, long)]
        row: String,

        /// Column id or name
        #[arg(short, long)]
        column: String,

        /// New value; JSON is accepted, anything else is taken as text
        value: String,

        /// Save the edited table
        #[arg(short, long)]
        write: bool,
    },
}

fn parse_column_type(s: &str) -> Result<ColumnType, String> {
    s.parse()
}

fn load_settings(path: Option<&PathBuf>) -> Result<TabulaSettings> {
    match path {
        Some(path) => TabulaSettings::load_from(path)
            .with_context(|| format!("Failed to load settings from {:?}", path)),
        None => TabulaSettings::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging_config = LoggingConfig::for_level(&cli.log_level);
    logging_config.json_console = cli.log_json;
    if cli.log_file {
        logging_config.log_dir = Some(logging::log_directory());
    }
    let _log_guards = logging::init(logging_config)?;

    let settings = load_settings(cli.settings.as_ref())?;

    match cli.command {
        Commands::Show {
            file,
            view,
            search,
            filter,
            sort,
            limit,
        } => {
            let options = ShowOptions {
                view,
                search,
                filters: filter,
                sorts: sort,
                limit,
            };
            println!("{}", commands::show(&file, settings, &options).await?);
        }
        Commands::Validate { file } => {
            let report = commands::validate(&file)?;
            println!("{}", report.render());
            if !report.is_clean() {
                bail!("{} invalid cells in {:?}", report.problems.len(), file);
            }
        }
        Commands::Convert {
            file,
            column,
            to,
            write,
        } => {
            println!(
                "{}",
                commands::convert(&file, settings, &column, to, write).await?
            );
        }
        Commands::Set {
            file,
            row,
            column,
            value,
            write,
        } => {
            println!(
                "{}",
                commands::set_cell(&file, settings, &row, &column, &value, write).await?
            );
        }
    }

    Ok(())
}
