// simulation_main.rs
//
// Loads a corridor from CSV (or generates a synthetic grid), runs the
// baseline and exports the results.
//
//   simulation_main [--config cfg.json] [--data DIR | --grid ROWSxCOLS] [--out DIR]

use corridor_sandbox::monitoring::export::export_evaluation;
use corridor_sandbox::network_model::grid::generate_grid;
use corridor_sandbox::network_model::loader::NetworkPaths;
use corridor_sandbox::{EngineConfig, EngineError, ScenarioRegistry};
use std::process::ExitCode;

struct Args {
    config: Option<String>,
    data: String,
    grid: Option<(usize, usize)>,
    out: String,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: None,
        data: "data".to_string(),
        grid: None,
        out: "output".to_string(),
    };
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut value = || it.next().ok_or_else(|| format!("{} needs a value", flag));
        match flag.as_str() {
            "--config" => args.config = Some(value()?),
            "--data" => args.data = value()?,
            "--out" => args.out = value()?,
            "--grid" => {
                let raw = value()?;
                let (rows, cols) = raw
                    .split_once('x')
                    .ok_or_else(|| format!("--grid expects ROWSxCOLS, got '{}'", raw))?;
                let rows = rows.parse().map_err(|_| format!("bad row count '{}'", rows))?;
                let cols = cols.parse().map_err(|_| format!("bad column count '{}'", cols))?;
                args.grid = Some((rows, cols));
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(args)
}

fn run(args: Args) -> Result<(), EngineError> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let registry = ScenarioRegistry::new(config);

    let handle = match args.grid {
        Some((rows, cols)) => {
            let network = generate_grid(rows, cols, 42, &registry.config().default_class_split)?;
            registry.insert(network)?
        }
        None => registry.load_network_from_paths(&NetworkPaths::in_dir(&args.data))?,
    };

    let baseline = registry.run_baseline(handle)?;
    println!("{:<8} {:<24} {:>8} {:>8} {:>8} {:>10}  Category", "Zone", "Name", "AQI", "PM2.5", "NO2", "Flow");
    for zone in &baseline.zones {
        println!(
            "{:<8} {:<24} {:>8.1} {:>8.1} {:>8.1} {:>10.0}  {}",
            zone.zone_id, zone.name, zone.aqi, zone.pm25, zone.no2, zone.total_flow_vph, zone.category
        );
    }
    if baseline.excluded_pair_count() > 0 {
        println!("{} OD pairs had no path and were excluded", baseline.excluded_pair_count());
    }

    export_evaluation(&args.out, &baseline)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
