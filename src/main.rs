mod config;
mod data;
mod dates;
mod error;
mod grid;
mod ledger;
mod planner;
mod scanner;
mod server;
mod solver;
mod workbook;

use clap::{Parser, Subcommand};
use config::{LayoutConfig, ServerConfig};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "lodima")]
#[command(version)]
#[command(about = "Assigns teachers to monthly course slots from spreadsheet grids")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill a course workbook with teacher names
    Generate {
        /// Remaining hours per teacher and class (one sheet per teacher)
        #[arg(long)]
        hours: PathBuf,

        /// Free half-days per teacher (one sheet per teacher)
        #[arg(long)]
        availability: PathBuf,

        /// Monthly course grid (one sheet per month)
        #[arg(long)]
        courses: PathBuf,

        #[arg(long, default_value = "Mois_avec_profs.xlsx")]
        output: PathBuf,

        /// JSON file overriding the grid layout
        #[arg(long)]
        layout: Option<PathBuf>,
    },

    /// Serve the upload API
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,

        #[arg(long)]
        layout: Option<PathBuf>,

        #[arg(long, default_value = "20")]
        max_upload_mb: usize,
    },
}

fn generate(
    hours: &Path,
    availability: &Path,
    courses: &Path,
    output: &Path,
    layout: &LayoutConfig,
) -> error::Result<()> {
    let hours = workbook::open(hours)?;
    let availability = workbook::open(availability)?;
    let mut course_book = workbook::open(courses)?;

    let result = planner::plan(
        workbook::sheets(&hours),
        workbook::sheets(&availability),
        workbook::sheets(&course_book),
        layout,
    );
    workbook::write_assignments(&mut course_book, &result)?;
    workbook::save(&course_book, output)?;

    println!(
        "{} of {} slots assigned; result written to {}",
        result.filled_slots,
        result.total_slots,
        output.display()
    );
    Ok(())
}

async fn run(args: Args) -> error::Result<()> {
    match args.command {
        Commands::Generate {
            hours,
            availability,
            courses,
            output,
            layout,
        } => {
            let layout = LayoutConfig::load(layout.as_deref())?;
            generate(&hours, &availability, &courses, &output, &layout)
        }
        Commands::Serve {
            addr,
            layout,
            max_upload_mb,
        } => {
            let config = ServerConfig {
                addr,
                max_upload_bytes: max_upload_mb * 1024 * 1024,
                layout: LayoutConfig::load(layout.as_deref())?,
            };
            server::run_server(config).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Erreur dans la génération : {e}");
            ExitCode::FAILURE
        }
    }
}
