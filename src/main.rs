// Entry point and high-level CLI flow.
//
// - Option [1] loads the bundled dataset and prints what will be excluded.
// - Option [2] builds the yearly and per-crop views, previews them and
//   exports CSV files plus a JSON overview.
// - `--batch` runs both steps once without prompting.
mod error;
mod loader;
mod logger;
mod output;
mod reports;
mod types;
mod util;

use clap::Parser;
use error::{DashboardError, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use types::Record;

#[derive(Parser, Debug, Clone)]
#[command(name = "agri_dashboard", about = "Indian agriculture production dashboard")]
struct Config {
    /// Dataset to load (.json array or .csv with the source column names)
    #[arg(long, env = "AGRI_DATA", default_value = "data.json")]
    input: String,

    /// Directory the report files are written to
    #[arg(long, env = "AGRI_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Rows shown per table preview
    #[arg(long, default_value_t = 5)]
    preview_rows: usize,

    /// Load and generate once, then exit
    #[arg(long)]
    batch: bool,

    #[arg(short, long)]
    verbose: bool,
}

// Loaded once, reused for every report generation in the same run.
#[derive(Default)]
struct AppState {
    data: Option<Vec<Record>>,
}

/// Read one line after the "Enter choice:" prompt. `None` on end of input.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Returns `true` if the user chose `Y`, `false` for `N` or end of input.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if matches!(io::stdin().read_line(&mut buf), Ok(0) | Err(_)) {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(config: &Config, state: &mut AppState) -> Result<()> {
    let (data, report) = loader::load_dataset(&config.input)?;
    tracing::info!(
        path = %config.input,
        rows = report.loaded_rows,
        parse_errors = report.parse_errors,
        "dataset loaded"
    );
    println!(
        "Processing dataset... ({} of {} rows loaded from {})",
        util::format_int(report.loaded_rows),
        util::format_int(report.total_rows),
        config.input
    );
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse errors.",
            util::format_int(report.parse_errors)
        );
    }
    println!(
        "Info: {} rows without production, {} rows without yield or cultivation area.\n",
        util::format_int(report.missing_production),
        util::format_int(report.missing_yield_or_area)
    );
    state.data = Some(data);
    Ok(())
}

fn export<T: serde::Serialize + tabled::Tabled>(path: &Path, rows: &[T]) {
    if let Err(e) = output::write_csv(path, rows) {
        tracing::error!(path = %path.display(), error = %e, "export failed");
        eprintln!("Write error: {}", e);
    }
}

fn handle_generate_reports(config: &Config, state: &AppState) -> Result<()> {
    let data = state.data.as_deref().ok_or(DashboardError::NoData)?;

    std::fs::create_dir_all(&config.out_dir)?;
    println!("Generating reports...\n");
    let years = reports::summarize_by_year(data);
    let crops = reports::summarize_by_crop(data);
    let overview = reports::generate_overview(data, &years, &crops);
    tracing::debug!(
        years = years.len(),
        crops = crops.len(),
        "aggregation finished"
    );

    let yearly = reports::yearly_rows(&years);
    let file1 = config.out_dir.join("yearly_production_summary.csv");
    export(&file1, &yearly);
    println!("Report 1: Indian Agriculture Analysis Dashboard");
    println!("(Highest and lowest production crop per financial year)\n");
    output::preview_table_rows(&yearly, config.preview_rows);
    println!("(Full table exported to {})\n", file1.display());

    let per_crop = reports::crop_rows(&crops);
    let file2 = config.out_dir.join("crop_performance.csv");
    export(&file2, &per_crop);
    println!("Report 2: Crop Performance Analysis");
    match (&overview.period_start, &overview.period_end) {
        (Some(start), Some(end)) => println!(
            "({} crops analyzed, average yield and cultivation area {}-{})\n",
            util::format_int(overview.crops_analyzed),
            start,
            end
        ),
        _ => println!(
            "({} crops analyzed)\n",
            util::format_int(overview.crops_analyzed)
        ),
    }
    output::preview_table_rows(&per_crop, config.preview_rows);
    println!("(Full table exported to {})\n", file2.display());

    let summary = config.out_dir.join("summary.json");
    if let Err(e) = output::write_json(&summary, &overview) {
        tracing::error!(path = %summary.display(), error = %e, "export failed");
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats ({}):", summary.display());
    println!("{}\n", output::summary_line(&overview));
    Ok(())
}

fn run_batch(config: &Config) -> Result<()> {
    let mut state = AppState::default();
    handle_load(config, &mut state)?;
    handle_generate_reports(config, &state)
}

fn run_interactive(config: &Config) {
    let mut state = AppState::default();
    loop {
        println!("Indian Agriculture Dashboard:");
        println!("[1] Load the dataset");
        println!("[2] Generate Reports");
        println!("[3] Exit\n");
        let Some(choice) = read_choice() else {
            println!("Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Err(e) = handle_load(config, &mut state) {
                    tracing::error!(error = %e, "load failed");
                    eprintln!("Failed to load file: {}\n", e);
                }
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(config, &state) {
                    println!("Error: {}\n", e);
                    continue;
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}

fn main() {
    let config = Config::parse();
    logger::init_logger(config.verbose);
    tracing::debug!(?config, "starting");

    if config.batch {
        if let Err(e) = run_batch(&config) {
            tracing::error!(error = %e, "batch run failed");
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    } else {
        run_interactive(&config);
    }
}
