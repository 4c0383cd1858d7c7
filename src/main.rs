use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use chamados_dashboard::analyzer::filters::FilterSelection;
use chamados_dashboard::analyzer::table::TableRequest;
use chamados_dashboard::commands::export::ExportFormat;
use chamados_dashboard::commands::{dashboard, export, import, table};
use chamados_dashboard::{AppState, DashboardConfig};

const SESSION: &str = "cli";

#[derive(Parser)]
#[command(name = "chamados-dashboard")]
#[command(version)]
#[command(about = "Indicadores, backlog e exportações de uma planilha de chamados")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file (missing keys take their defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard report as JSON
    Report {
        /// Spreadsheet (.xlsx) or delimited text (.csv) export
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Write the filtered records, the backlog workbook or both as a ZIP
    Export {
        file: PathBuf,

        /// Output path (defaults to the format's file name in the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "zip")]
        format: ExportFormat,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Print the raw-data table view as JSON
    Table {
        file: PathBuf,

        /// Column to show (repeatable; all available columns when omitted)
        #[arg(long = "column")]
        columns: Vec<String>,

        /// Sort column (defaults to the service time)
        #[arg(long)]
        sort: Option<String>,

        /// Ascending order instead of descending
        #[arg(long)]
        asc: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Args, Default)]
struct FilterArgs {
    /// First opening day included (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last opening day included (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Situação (repeatable)
    #[arg(long = "status")]
    statuses: Vec<String>,

    /// Categoria 2 (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Categoria 1 (repeatable)
    #[arg(long = "type")]
    types: Vec<String>,

    /// Equipe (repeatable)
    #[arg(long = "team")]
    teams: Vec<String>,

    /// Responsável (repeatable)
    #[arg(long = "owner")]
    owners: Vec<String>,

    /// Prioridade (repeatable)
    #[arg(long = "priority")]
    priorities: Vec<String>,

    /// Etapa (repeatable)
    #[arg(long = "stage")]
    stages: Vec<String>,
}

impl FilterArgs {
    fn into_selection(self) -> FilterSelection {
        // an option never given leaves the field unrestricted
        let opt = |v: Vec<String>| (!v.is_empty()).then_some(v);
        FilterSelection {
            date_from: self.from,
            date_to: self.to,
            statuses: opt(self.statuses),
            categories: opt(self.categories),
            types: opt(self.types),
            teams: opt(self.teams),
            owners: opt(self.owners),
            priorities: opt(self.priorities),
            stages: opt(self.stages),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Erro: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = DashboardConfig::load(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let state = AppState::new(config);

    match cli.command {
        Commands::Report { file, filters } => {
            load(&state, &file)?;
            let report = dashboard::get_dashboard_report(&state, SESSION, &filters.into_selection())?;
            print_json(&report)
        }
        Commands::Export {
            file,
            out,
            format,
            filters,
        } => {
            load(&state, &file)?;
            let path = out.unwrap_or_else(|| PathBuf::from(format.default_file_name()));
            let res = export::export_report(
                &state,
                SESSION,
                &filters.into_selection(),
                format,
                path.to_string_lossy().into_owned(),
            )?;
            print_json(&res)
        }
        Commands::Table {
            file,
            columns,
            sort,
            asc,
            filters,
        } => {
            load(&state, &file)?;
            let request = TableRequest {
                columns: (!columns.is_empty()).then_some(columns),
                sort_by: sort,
                ascending: asc,
            };
            let view =
                table::get_table_view(&state, SESSION, &filters.into_selection(), &request)?;
            print_json(&view)
        }
    }
}

/// A file that cannot be loaded stops the run.
fn load(state: &AppState, file: &std::path::Path) -> Result<(), String> {
    let res = import::import_file(state, SESSION, &file.to_string_lossy())?;
    match res.load_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}
