// Console front end.
//
// - Option [1] checks and parses the CSV, printing counts, errors and warnings.
// - Option [2] builds the dashboard summary, exports it and prints previews.
// - After generating reports, the user can go back to the menu or exit.
// `--batch` runs both steps once without prompting.
use anyhow::{bail, Context, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use run_report::types::{ParseResult, PersonSummaryRow};
use run_report::{loader, output, reports, util};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::info;
use tracing_subscriber::EnvFilter;

const ERROR_PREVIEW_LIMIT: usize = 10;

#[derive(Parser, Debug)]
#[command(author, version, about = "Validate a running log CSV and summarize it", long_about = None)]
struct Cli {
    /// CSV file with `date`, `person` and `miles run` columns
    #[arg(default_value = "running_data.csv")]
    path: PathBuf,

    /// Directory that receives the exported reports
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Rows shown in each console preview table
    #[arg(long, default_value_t = 5)]
    preview: usize,

    /// Load and report once, then exit
    #[arg(long)]
    batch: bool,
}

// Parsed once, reported as many times as the user asks.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { result: None }));

struct AppState {
    result: Option<ParseResult>,
}

fn app_state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Print `prompt` and read one trimmed line. `None` once the input is closed.
fn read_line_from<R: BufRead>(input: &mut R, prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_line(prompt: &str) -> Option<String> {
    read_line_from(&mut io::stdin().lock(), prompt)
}

fn read_choice() -> Option<String> {
    read_line("Enter choice: ")
}

/// Returns `true` for `Y`, `false` for `N` or a closed stdin.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to Report Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_problems(result: &ParseResult) {
    if !result.errors.is_empty() {
        println!("Validation Errors Found ({} errors)", util::format_int(result.errors.len()));
        println!("Please fix the following issues in your CSV file:");
        let lines = loader::format_errors(&result.errors);
        for line in lines.iter().take(ERROR_PREVIEW_LIMIT) {
            println!("  - {}", line);
        }
        if lines.len() > ERROR_PREVIEW_LIMIT {
            println!("  ... and {} more errors", lines.len() - ERROR_PREVIEW_LIMIT);
        }
        println!();
    }
    if !result.warnings.is_empty() {
        println!("Data Quality Warnings");
        for w in &result.warnings {
            println!("  - {}", w);
        }
        println!();
    }
}

/// Option [1]. Returns whether the file parsed cleanly.
fn handle_load(path: &Path) -> bool {
    if let Err(e) = loader::check_file(path) {
        eprintln!("Failed to load file: {}\n", e);
        app_state().result = None;
        return false;
    }
    let result = loader::parse_csv_file(path);
    println!(
        "Processing dataset... ({} records accepted, {} errors)",
        util::format_int(result.data.len()),
        util::format_int(result.errors.len())
    );
    println!();
    print_problems(&result);
    let ok = result.success;
    let mut state = app_state();
    state.result = Some(result);
    ok
}

/// Option [2]. Writes three files under `out_dir` and prints previews.
fn handle_generate_reports(cli: &Cli) -> Result<()> {
    let result = app_state().result.clone();
    let Some(result) = result else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return Ok(());
    };
    if !result.success {
        println!("Error: The loaded file has validation errors. Fix them and load it again.\n");
        return Ok(());
    }
    if result.data.is_empty() {
        println!("No valid data found. Please upload a CSV with the correct format.\n");
        return Ok(());
    }

    let summary = reports::generate_dashboard_summary(&result.data);
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;
    let out = |name: &str| cli.out_dir.join(name).to_string_lossy().into_owned();

    println!("Generating reports...\n");
    let m = &summary.overall_metrics;
    println!("Overview");
    println!("  Total distance: {}", util::format_miles(m.total_distance));
    println!("  Average run:    {}", util::format_miles(m.average_distance));
    println!(
        "  Longest run:    {} (shortest: {})",
        util::format_miles(m.max_distance),
        util::format_miles(m.min_distance)
    );
    println!(
        "  Runs: {}, people: {}",
        util::format_int(m.run_count),
        util::format_int(summary.unique_people.len())
    );
    if let (Some(start), Some(end)) = (m.date_range.start, m.date_range.end) {
        println!("  Dates: {} - {}", start.format("%b %d"), end.format("%b %d, %Y"));
    }
    if let Some(days) = reports::active_period_days(&m.date_range) {
        println!("  Active period: {} days", days);
    }
    println!();

    let rows: Vec<PersonSummaryRow> = reports::person_summary_rows(&summary.person_stats);
    let file1 = out("person_summary.csv");
    output::write_csv(&file1, &rows)?;
    println!("Per-Person Breakdown\n");
    output::preview_table_rows(&rows, cli.preview);
    println!("(Full table exported to {})\n", file1);

    let chart = reports::chart_rows(&summary.chart_data, &summary.unique_people);
    let file2 = out("chart_data.csv");
    output::write_chart_csv(&file2, &summary.unique_people, &chart)?;
    println!("Daily Distance by Person\n");
    output::preview_chart_rows(&summary.unique_people, &chart, cli.preview);
    println!("(Full table exported to {})\n", file2);

    let file3 = out("dashboard_summary.json");
    output::write_json(&file3, &summary)?;
    println!("Dashboard summary written to {}\n", file3);
    info!(records = summary.total_records, "reports generated");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("run_report=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.batch {
        if !handle_load(&cli.path) {
            bail!("{} did not pass validation", cli.path.display());
        }
        return handle_generate_reports(&cli);
    }

    loop {
        println!("Running Log Report ({})", cli.path.display());
        println!("[1] Load the file");
        println!("[2] Generate Reports\n");
        let Some(choice) = read_choice() else {
            println!("Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => {
                handle_load(&cli.path);
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(&cli) {
                    eprintln!("Write error: {:#}", e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
    Ok(())
}
