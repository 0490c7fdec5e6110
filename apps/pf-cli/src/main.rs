use clap::{Parser, Subcommand};
use pf_app::{
    AppError, AppResult, CatalogCache, ConfigOverrides, Duty, DutyAnswer, SelectionResponse,
    load_duties, resolve_config, run_duties, summarize,
};
use pf_select::SelectionMode;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "pumpflow")]
#[command(about = "PumpFlow CLI - centrifugal pump selection from manufacturer catalogs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select pumps for one or more duty points
    Select {
        /// Path to the catalog (.csv, .json, .yaml, .xlsx)
        catalog_path: PathBuf,
        /// Desired flow in m³/h
        #[arg(long, requires = "pressure")]
        flow: Option<f64>,
        /// Desired pressure (head) in mca
        #[arg(long, requires = "flow")]
        pressure: Option<f64>,
        /// Extra duty as FLOW:PRESSURE; repeatable, all answered from one catalog load
        #[arg(long = "duty", value_name = "FLOW:PRESSURE")]
        duties: Vec<Duty>,
        /// Number of ranked rows to keep
        #[arg(long)]
        top_n: Option<usize>,
        /// Selection config YAML file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Ranking policy: simple, refined or grouped
        #[arg(long)]
        policy: Option<String>,
        /// Tolerance preset: narrow, standard or wide
        #[arg(long)]
        tolerance: Option<String>,
        /// Minimum best-row efficiency (%) for a single pump
        #[arg(long)]
        quality_gate: Option<f64>,
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Answer every duty of a CSV file (flow,pressure) against one catalog load
    Batch {
        /// Path to the catalog
        catalog_path: PathBuf,
        /// Duties CSV with a flow,pressure header
        duties_path: PathBuf,
        /// Number of ranked rows to keep
        #[arg(long)]
        top_n: Option<usize>,
        /// Selection config YAML file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Ranking policy: simple, refined or grouped
        #[arg(long)]
        policy: Option<String>,
        /// Tolerance preset: narrow, standard or wide
        #[arg(long)]
        tolerance: Option<String>,
        /// Minimum best-row efficiency (%) for a single pump
        #[arg(long)]
        quality_gate: Option<f64>,
        /// Print the answers as JSON
        #[arg(long)]
        json: bool,
        /// Write the JSON answers to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Summarize a catalog: counts, gaps and per-model envelopes
    Inspect {
        /// Path to the catalog
        catalog_path: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that a catalog loads and enriches
    Validate {
        /// Path to the catalog
        catalog_path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Select {
            catalog_path,
            flow,
            pressure,
            mut duties,
            top_n,
            config,
            policy,
            tolerance,
            quality_gate,
            json,
        } => {
            let overrides = ConfigOverrides {
                policy,
                tolerance,
                quality_gate,
                top_n,
            };
            if let (Some(flow), Some(pressure)) = (flow, pressure) {
                duties.insert(0, Duty { flow, pressure });
            }
            cmd_select(&catalog_path, &duties, config.as_deref(), &overrides, json)
        }
        Commands::Batch {
            catalog_path,
            duties_path,
            top_n,
            config,
            policy,
            tolerance,
            quality_gate,
            json,
            output,
        } => {
            let overrides = ConfigOverrides {
                policy,
                tolerance,
                quality_gate,
                top_n,
            };
            cmd_batch(
                &catalog_path,
                &duties_path,
                config.as_deref(),
                &overrides,
                json,
                output.as_deref(),
            )
        }
        Commands::Inspect { catalog_path, json } => cmd_inspect(&catalog_path, json),
        Commands::Validate { catalog_path } => cmd_validate(&catalog_path),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::InvalidInput(format!("Failed to serialize output: {}", e)))
}

fn cmd_select(
    catalog_path: &Path,
    duties: &[Duty],
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    json: bool,
) -> AppResult<()> {
    if duties.is_empty() {
        return Err(AppError::InvalidInput(
            "give --flow and --pressure, or at least one --duty".to_string(),
        ));
    }
    let config = resolve_config(config_path, overrides)?;
    let cache = CatalogCache::new();
    let answers = run_duties(&cache, catalog_path, duties, &config)?;

    match answers.as_slice() {
        [only] if json => println!("{}", to_json(&only.response)?),
        _ if json => println!("{}", to_json(&answers)?),
        _ => print_answers(&answers),
    }
    Ok(())
}

fn cmd_batch(
    catalog_path: &Path,
    duties_path: &Path,
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    json: bool,
    output: Option<&Path>,
) -> AppResult<()> {
    let config = resolve_config(config_path, overrides)?;
    let duties = load_duties(duties_path)?;
    let cache = CatalogCache::new();
    let answers = run_duties(&cache, catalog_path, &duties, &config)?;

    if let Some(output) = output {
        std::fs::write(output, to_json(&answers)?)?;
        println!("Wrote {} answers to {}", answers.len(), output.display());
    } else if json {
        println!("{}", to_json(&answers)?);
    } else {
        print_answers(&answers);
    }
    Ok(())
}

fn print_answers(answers: &[DutyAnswer]) {
    for (i, answer) in answers.iter().enumerate() {
        if i > 0 {
            println!();
        }
        debug!(loaded_from_cache = answer.loaded_from_cache, "duty answered");
        print_selection(&answer.response);
    }
}

fn print_selection(response: &SelectionResponse) {
    println!(
        "Duty: {:.1} m³/h at {:.1} mca",
        response.desired.flow, response.desired.pressure
    );

    if response.mode == SelectionMode::None {
        println!("No pump in the catalog serves this duty (single, parallel or series)");
        return;
    }

    println!(
        "Mode: {} ({} pump{})",
        response.mode,
        response.pump_count,
        if response.pump_count == 1 { "" } else { "s" }
    );
    if response.mode != SelectionMode::Single {
        println!(
            "  Per-pump duty: {:.1} m³/h at {:.1} mca",
            response.stage_target.flow, response.stage_target.pressure
        );
    }

    println!(
        "\n  {:<3} {:<16} {:<10} {:>9} {:>9} {:>7} {:>8} {:>8} {:>8} {:>6}",
        "#", "Model", "Rotor", "Flow", "Press.", "Eff.%", "ΔP", "Q-rel", "Power", "Motor"
    );
    for (i, pump) in response.pumps.iter().enumerate() {
        let row = &pump.row;
        let centring = row
            .relative_flow_error
            .map(|e| format!("{:+.2}", e))
            .unwrap_or_else(|| "-".to_string());
        let motor = row
            .standard_motor
            .map(|m| m.to_string())
            .unwrap_or_else(|| ">max".to_string());
        println!(
            "  {:<3} {:<16} {:<10} {:>9.1} {:>9.1} {:>7.1} {:>+8.2} {:>8} {:>8.1} {:>6}",
            i + 1,
            row.model,
            row.rotor_label,
            row.flow,
            row.pressure,
            row.efficiency,
            row.pressure_error,
            centring,
            row.power,
            motor
        );
    }

    if response.pump_count > 1 {
        println!("\nInstalled totals:");
        for (i, pump) in response.pumps.iter().enumerate() {
            println!(
                "  {:<3} {:>9.1} m³/h  {:>7.1} mca  {:>8.1} HP",
                i + 1,
                pump.system.flow,
                pump.system.pressure,
                pump.system.power
            );
        }
    }
}

fn cmd_inspect(catalog_path: &Path, json: bool) -> AppResult<()> {
    let load = CatalogCache::new().load(catalog_path)?;
    let summary = summarize(&load.catalog);

    if json {
        println!("{}", to_json(&summary)?);
        return Ok(());
    }

    println!("Catalog: {}", load.path.display());
    println!("  Format: {:?}", load.format);
    println!(
        "  Units: flow {:?}, head {:?}, power {:?}",
        load.units.flow, load.units.head, load.units.power
    );
    println!("  Records: {}", summary.record_count);
    println!("  Models: {}", summary.model_count);
    println!("  Rows beyond motor ladder: {}", summary.rows_without_motor);
    println!(
        "  Rows with unparseable rotor label: {}",
        summary.rows_without_rotor_rank
    );
    println!("  Fingerprint: {}", summary.fingerprint);

    println!(
        "\n  {:<16} {:>5} {:>8} {:>8} {:>9} {:>9} {:>9}  Rotors",
        "Model", "Rows", "Rank-", "Rank+", "Pmax", "Qmin", "Qmax"
    );
    let rank = |r: Option<f64>| r.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string());
    for model in &summary.models {
        println!(
            "  {:<16} {:>5} {:>8} {:>8} {:>9.1} {:>9.1} {:>9.1}  {}",
            model.model,
            model.record_count,
            rank(model.rotor_rank_min),
            rank(model.rotor_rank_max),
            model.pressure_max,
            model.flow_min,
            model.flow_max,
            model.rotor_labels.join(", ")
        );
    }
    Ok(())
}

fn cmd_validate(catalog_path: &Path) -> AppResult<()> {
    println!("Validating catalog: {}", catalog_path.display());
    let load = CatalogCache::new().load(catalog_path)?;
    println!(
        "✓ Catalog is valid ({} records, {} models)",
        load.catalog.len(),
        load.catalog.models().len()
    );
    Ok(())
}
