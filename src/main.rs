use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod domain;
mod inputter;
mod loader;
mod model;
mod pagination;
mod ui;

use controller::Controller;
use domain::{TableConfig, TablyError};
use loader::Dataset;
use model::{Model, Status};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data file to view (csv, parquet or arrow)
    path: String,

    /// Rows per page
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Numeric page slots shown in the pagination control
    #[arg(long, default_value_t = 5)]
    max_visible: usize,

    /// Also show first/last page controls
    #[arg(long)]
    first_last: bool,

    /// Show all rows instead of paginating
    #[arg(long)]
    no_pagination: bool,

    /// Disable the search box
    #[arg(long)]
    no_search: bool,

    /// Placeholder text for the search box
    #[arg(long)]
    placeholder: Option<String>,
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run() -> Result<(), TablyError> {
    let cli = Cli::parse();

    let path = shellexpand::full(&cli.path)
        .map_err(|e| TablyError::LoadingFailed(e.to_string()))?
        .to_string();
    let dataset = Dataset::load(PathBuf::from(path))?;

    let mut config = TableConfig::default()
        .page_size(cli.page_size)
        .max_visible(cli.max_visible)
        .show_first_last(cli.first_last)
        .pagination(!cli.no_pagination)
        .searchable(!cli.no_search);
    if let Some(placeholder) = cli.placeholder {
        config = config.search_placeholder(placeholder);
    }

    let controller = Controller::new(&config);
    let mut model = Model::new(dataset, config);

    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui::draw(&model.view(), f))?;

        // Handle events and map them to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }
    }

    Ok(())
}

// The terminal owns stdout, so logs go to a file when TABLY_LOG is set.
fn init_tracing() {
    let Ok(path) = std::env::var("TABLY_LOG") else {
        return;
    };
    let Ok(file) = File::create(path) else {
        return;
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        .init();
}
