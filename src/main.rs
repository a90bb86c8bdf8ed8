use anyhow::{bail, Context, Result};
use crossterm::style::Stylize;
use fleet_table::api_client::HttpPageSource;
use fleet_table::config::Config;
use fleet_table::data::datatable_loaders::{load_rows, LoadedRows};
use fleet_table::table::{InMemoryPageSource, LatestRequest};
use fleet_table::{ColumnDescriptor, DataRow, PageSource, TableController, TableMode};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

mod commands;
mod table_display;

use commands::Command;
use table_display::{display_page, export_to_csv};

type Controller = TableController<DataRow, LatestRequest>;

fn print_help() {
    println!("{}", "fleet-table - paginated table explorer".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  fleet-table [OPTIONS] FILE.csv|FILE.json");
    println!("  fleet-table [OPTIONS] --api URL");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}      - Rows per page", "--page-size N".green());
    println!("  {}       - Server mode threshold", "--threshold N".green());
    println!("  {}     - Column search debounce delay", "--debounce-ms N".green());
    println!("  {}         - Fetch pages from a REST backend", "--api URL".green());
    println!(
        "  {} - Write a commented config file",
        "--generate-config".green()
    );
    println!();
    println!("{}", "Commands:".yellow());
    println!("  {}        - Go to page N", "page N".green());
    println!("  {}     - Next / previous page", "next, prev".green());
    println!("  {}      - Sort by column (again to flip)", "sort COL".green());
    println!("  {} - Filter a column (debounced)", "search COL TEXT".green());
    println!("  {}     - Remove a column filter", "clear COL".green());
    println!("  {}   - Free-text query over searchable columns", "query TEXT".green());
    println!("  {}     - Redraw / list columns", "show, columns".green());
    println!("  {}   - Show recent log entries", "\\logs [N]".green());
    println!("  {} - Export current page to CSV", "\\export FILE".green());
    println!("  {}   - Help / exit", "\\help, \\quit".green());
    println!();
}

#[derive(Debug, Default)]
struct Args {
    data_file: Option<PathBuf>,
    api_url: Option<String>,
    page_size: Option<usize>,
    threshold: Option<usize>,
    debounce_ms: Option<u64>,
    help: bool,
    generate_config: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
        args.get(i + 1)
            .map(String::as_str)
            .with_context(|| format!("{} needs a value", flag))
    }

    let mut parsed = Args::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--help" | "-h" => parsed.help = true,
            "--generate-config" => parsed.generate_config = true,
            "--page-size" => {
                parsed.page_size = Some(value(args, i, arg)?.parse()?);
                i += 1;
            }
            "--threshold" => {
                parsed.threshold = Some(value(args, i, arg)?.parse()?);
                i += 1;
            }
            "--debounce-ms" => {
                parsed.debounce_ms = Some(value(args, i, arg)?.parse()?);
                i += 1;
            }
            "--api" => {
                parsed.api_url = Some(value(args, i, arg)?.to_string());
                i += 1;
            }
            other if other.starts_with("--") => bail!("Unknown option: {}", other),
            file => parsed.data_file = Some(PathBuf::from(file)),
        }
        i += 1;
    }
    Ok(parsed)
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::create_default_with_comments())?;
    println!("Configuration file created at: {:?}", path);
    Ok(())
}

/// Columns seen across a set of rows. Keys within a row come out sorted;
/// a key first seen in a later row is appended.
fn columns_from_rows(rows: &[DataRow]) -> Vec<ColumnDescriptor> {
    let mut seen = BTreeSet::new();
    let mut columns = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.to_string()) {
                columns.push(ColumnDescriptor::new(key, key).searchable());
            }
        }
    }
    columns
}

/// Build the controller plus the backend that serves its server-mode pages
fn open_table(
    args: &Args,
    config: &Config,
) -> Result<(Controller, Vec<ColumnDescriptor>, Box<dyn PageSource<DataRow>>)> {
    let mut options = config.table_options();
    if let Some(page_size) = args.page_size {
        options = options.with_page_size(page_size);
    }
    if let Some(threshold) = args.threshold {
        options = options.with_threshold(threshold);
    }
    if let Some(ms) = args.debounce_ms {
        options = options.with_debounce(std::time::Duration::from_millis(ms));
    }

    let api_url = args
        .api_url
        .clone()
        .or_else(|| Some(config.api.base_url.clone()).filter(|u| !u.is_empty()));

    if let Some(file) = &args.data_file {
        let LoadedRows { columns, rows } = load_rows(file)?;
        let total = rows.len();
        let options = options.with_columns(columns.clone());
        let backend = InMemoryPageSource::new(rows.clone())
            .with_searchable_columns(columns.iter().filter(|c| c.searchable).map(|c| c.key.clone()));

        let controller = if options.mode_for(total) == TableMode::Server {
            let mut controller =
                TableController::new(Vec::new(), total, options, LatestRequest::new());
            let first = backend.fetch(&controller.fetch_request())?;
            controller.apply_page(first.rows, first.total_records);
            controller
        } else {
            TableController::new(rows, total, options, LatestRequest::new())
        };
        let backend: Box<dyn PageSource<DataRow>> = Box::new(backend);
        return Ok((controller, columns, backend));
    }

    if let Some(url) = api_url {
        let backend: HttpPageSource<DataRow> = HttpPageSource::new(&url, &config.api.page_path);
        let first_request =
            TableController::<DataRow, ()>::new(Vec::new(), usize::MAX, options.clone(), ())
                .fetch_request();
        let first = backend.fetch(&first_request)?;
        let columns = columns_from_rows(&first.rows);
        let options = options.with_columns(columns.clone());
        info!(target: "fetch", "{} reports {} records", url, first.total_records);

        let controller = if options.mode_for(first.total_records) == TableMode::Client {
            // Small enough to hold locally: pull everything in one page
            let mut all = first_request;
            all.page_size = first.total_records.max(1);
            let everything = backend.fetch(&all)?;
            TableController::new(everything.rows, first.total_records, options, LatestRequest::new())
        } else {
            TableController::new(first.rows, first.total_records, options, LatestRequest::new())
        };
        let backend: Box<dyn PageSource<DataRow>> = Box::new(backend);
        return Ok((controller, columns, backend));
    }

    bail!("No data source: pass a .csv/.json file or --api URL")
}

/// Serve whatever the controller asked for since the last turn
fn service_requests(controller: &mut Controller, backend: &dyn PageSource<DataRow>) {
    if let Some(request) = controller.delegate_mut().take() {
        match backend.fetch(&request) {
            Ok(page) => controller.apply_page(page.rows, page.total_records),
            Err(e) => {
                warn!(target: "fetch", "fetch failed: {:#}", e);
                eprintln!("{}", format!("Error: {:#}", e).red());
            }
        }
    }
}

/// Let a pending column search settle, then commit it
fn settle_debounce(controller: &mut Controller) {
    if let Some(remaining) = controller.debounce_remaining() {
        std::thread::sleep(remaining);
    }
    controller.poll_debounce();
}

fn print_columns(columns: &[ColumnDescriptor]) {
    for column in columns {
        let marker = if column.searchable { " (searchable)" } else { "" };
        println!("  {}{}", column.key.as_str().cyan(), marker);
    }
}

fn print_logs(count: usize) {
    match fleet_table::logging::get_log_buffer() {
        Some(buffer) => {
            for entry in buffer.get_recent(count) {
                println!("{}", entry.format_for_display());
            }
        }
        None => println!("{}", "Logging is not initialised.".yellow()),
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        warn!(target: "config", "using defaults: {:#}", e);
        Config::default()
    });

    let (mut controller, columns, backend) = open_table(&args, &config)?;
    print_help();
    display_page(&controller.snapshot(), &columns, &config.display);

    let history_file = dirs::data_dir()
        .map(|d| d.join("fleet-table").join("history.txt"))
        .unwrap_or_else(|| Path::new(".fleet_table_history").to_path_buf());
    if let Some(parent) = history_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let history = Box::new(
        FileBackedHistory::with_file(200, history_file)
            .map_err(|e| anyhow::anyhow!("Error configuring history: {}", e))?,
    );
    let mut line_editor = Reedline::create().with_history(history);
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("table".to_string()),
        DefaultPromptSegment::Empty,
    );

    loop {
        let sig = line_editor.read_line(&prompt)?;
        let buffer = match sig {
            Signal::Success(buffer) => buffer,
            Signal::CtrlD | Signal::CtrlC => {
                controller.cancel_pending_search();
                println!("\nGoodbye!");
                break;
            }
        };
        if buffer.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&buffer) {
            Ok(command) => command,
            Err(usage) => {
                eprintln!("{}", usage.red());
                continue;
            }
        };

        match command {
            Command::Page(page) => controller.set_page(page),
            Command::Next => controller.next_page(),
            Command::Prev => controller.previous_page(),
            Command::Sort(column) => controller.set_sort(&column),
            Command::Search { column, text } => {
                controller.set_column_search(&column, &text);
                settle_debounce(&mut controller);
            }
            Command::Clear(column) => {
                controller.set_column_search(&column, "");
                settle_debounce(&mut controller);
            }
            Command::Query(query) => controller.set_search_query(query),
            Command::Show => {}
            Command::Columns => {
                print_columns(&columns);
                continue;
            }
            Command::Logs(count) => {
                print_logs(count);
                continue;
            }
            Command::Export(file) => {
                let rows = controller.rows();
                match export_to_csv(rows.as_slice(), &columns, Path::new(&file)) {
                    Ok(()) => println!("{}", format!("Page exported to {}", file).green()),
                    Err(e) => eprintln!("{}", format!("Export error: {:#}", e).red()),
                }
                continue;
            }
            Command::Help => {
                print_help();
                continue;
            }
            Command::Quit => {
                controller.cancel_pending_search();
                break;
            }
        }

        service_requests(&mut controller, backend.as_ref());
        display_page(&controller.snapshot(), &columns, &config.display);
    }

    Ok(())
}

fn main() -> Result<()> {
    fleet_table::logging::init_tracing();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&raw)?;

    if args.help {
        print_help();
        return Ok(());
    }
    if args.generate_config {
        return generate_config();
    }

    run(args)
}
