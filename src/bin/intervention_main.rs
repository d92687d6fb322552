// intervention_main.rs
//
// Applies one intervention to a corridor, prints its impact against the
// baseline and lists the ranked recommendations.
//
//   intervention_main [--config cfg.json] [--data DIR] TYPE TARGET... \
//       [--ban-fraction F] [--odd-even-fraction F] [--lane-delta N] [--cycle-delta S] [--green-delta S] \
//       [--window START-END] [--threshold VC]

use corridor_sandbox::intervention_engine::InterventionParams;
use corridor_sandbox::network_model::loader::NetworkPaths;
use corridor_sandbox::{EngineConfig, EngineError, ScenarioRegistry};
use std::process::ExitCode;
use std::str::FromStr;

struct Args {
    config: Option<String>,
    data: String,
    kind: String,
    targets: Vec<String>,
    params: InterventionParams,
}

fn parse_value<T: FromStr>(flag: &str, raw: Option<String>) -> Result<T, String> {
    let raw = raw.ok_or_else(|| format!("{} needs a value", flag))?;
    raw.parse().map_err(|_| format!("bad value '{}' for {}", raw, flag))
}

fn parse_args() -> Result<Args, String> {
    let mut config = None;
    let mut data = "data".to_string();
    let mut params = InterventionParams::default();
    let mut positional = Vec::new();

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => config = Some(parse_value::<String>(&arg, it.next())?),
            "--data" => data = parse_value(&arg, it.next())?,
            "--ban-fraction" => params.ban_fraction = Some(parse_value(&arg, it.next())?),
            "--odd-even-fraction" => params.odd_even_fraction = Some(parse_value(&arg, it.next())?),
            "--lane-delta" => params.lane_delta = Some(parse_value(&arg, it.next())?),
            "--cycle-delta" => params.cycle_delta_s = Some(parse_value(&arg, it.next())?),
            "--green-delta" => params.green_delta_s = Some(parse_value(&arg, it.next())?),
            "--threshold" => params.congestion_threshold = Some(parse_value(&arg, it.next())?),
            "--window" => {
                let raw: String = parse_value(&arg, it.next())?;
                let (start, end) = raw
                    .split_once('-')
                    .ok_or_else(|| format!("--window expects START-END, got '{}'", raw))?;
                params.time_window = Some((
                    parse_value("--window start", Some(start.to_string()))?,
                    parse_value("--window end", Some(end.to_string()))?,
                ));
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag '{}'", flag)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let kind = positional
        .next()
        .ok_or_else(|| "missing intervention type".to_string())?;
    Ok(Args {
        config,
        data,
        kind,
        targets: positional.collect(),
        params,
    })
}

fn run(args: Args) -> Result<(), EngineError> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let registry = ScenarioRegistry::new(config);
    let handle = registry.load_network_from_paths(&NetworkPaths::in_dir(&args.data))?;

    let applied = registry.apply_intervention(handle, &args.kind, &args.targets, &args.params)?;
    let impact = registry.impact(handle, applied.intervention_id)?;

    println!("Intervention {} ({})", applied.intervention_id, args.kind);
    println!("  AQI reduction      {:>8.2}", impact.aqi_reduction);
    println!("  Speed change       {:>7.2}%", impact.speed_change_pct);
    println!("  Traffic change     {:>7.2}%", impact.traffic_change_pct);
    println!("  Delay change       {:>7.2}%", impact.delay_change_pct);
    println!("  Lives saved (est.) {:>8.2}", impact.lives_saved_estimate);
    println!("  Fewer affected     {:>8}", impact.affected_population_reduction);
    for delta in &impact.zone_deltas {
        println!(
            "    {:<8} {:>7.1} -> {:>7.1}  affected {:>8} -> {:>8}",
            delta.zone_id,
            delta.baseline_aqi,
            delta.scenario_aqi,
            delta.baseline_affected_population,
            delta.scenario_affected_population
        );
    }

    registry.reset_interventions(handle)?;
    println!();
    println!("Recommendations from baseline:");
    for (rank, rec) in registry.recommendations(handle)?.iter().enumerate() {
        println!(
            "  {}. {:<17} score {:>12.1}  AQI -{:>6.2}  confidence {:.2}  [{}]",
            rank + 1,
            rec.intervention_type.to_string(),
            rec.score,
            rec.predicted_impact.aqi_reduction,
            rec.confidence_score,
            rec.targets.join(", ")
        );
    }
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
            eprintln!("Intervention failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
