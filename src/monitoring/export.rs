use crate::errors::{EngineError, Result};
use crate::shared_data::{Evaluation, SegmentResult, ZoneResult};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Flat CSV row for a segment result.
#[derive(Debug, Serialize)]
pub struct SegmentRecord<'a> {
    pub segment_id: &'a str,
    pub zone_id: &'a str,
    pub flow_vph: f64,
    pub car_vph: f64,
    pub truck_vph: f64,
    pub bus_vph: f64,
    pub auto_vph: f64,
    pub vc_ratio: f64,
    pub speed_kmh: f64,
    pub travel_time_min: f64,
    pub signal_delay_s: f64,
    pub capacity_undefined: bool,
    pub pm25_g_per_h: f64,
    pub nox_g_per_h: f64,
    pub co_g_per_h: f64,
}

impl<'a> From<&'a SegmentResult> for SegmentRecord<'a> {
    fn from(r: &'a SegmentResult) -> Self {
        let [car_vph, truck_vph, bus_vph, auto_vph] = r.class_flows.0;
        Self {
            segment_id: &r.segment_id,
            zone_id: &r.zone_id,
            flow_vph: r.flow_vph,
            car_vph,
            truck_vph,
            bus_vph,
            auto_vph,
            vc_ratio: r.vc_ratio,
            speed_kmh: r.speed_kmh,
            travel_time_min: r.travel_time_min,
            signal_delay_s: r.signal_delay_s,
            capacity_undefined: r.capacity_undefined,
            pm25_g_per_h: r.emissions.pm25,
            nox_g_per_h: r.emissions.nox,
            co_g_per_h: r.emissions.co,
        }
    }
}

/// Flat CSV row for a zone result.
#[derive(Debug, Serialize)]
pub struct ZoneRecord<'a> {
    pub zone_id: &'a str,
    pub name: &'a str,
    pub population: u64,
    pub aqi: f64,
    pub category: String,
    pub pm25: f64,
    pub no2: f64,
    pub mean_speed_kmh: f64,
    pub total_flow_vph: f64,
    pub health_risk: String,
    pub affected_population: u64,
    pub respiratory_symptoms_pct: f64,
}

impl<'a> From<&'a ZoneResult> for ZoneRecord<'a> {
    fn from(r: &'a ZoneResult) -> Self {
        Self {
            zone_id: &r.zone_id,
            name: &r.name,
            population: r.population,
            aqi: r.aqi,
            category: r.category.to_string(),
            pm25: r.pm25,
            no2: r.no2,
            mean_speed_kmh: r.mean_speed_kmh,
            total_flow_vph: r.total_flow_vph,
            health_risk: r.health.risk.to_string(),
            affected_population: r.health.affected_population,
            respiratory_symptoms_pct: r.health.respiratory_symptoms_pct,
        }
    }
}

/// Generic helper to write a batch of records as CSV with a header row.
fn write_csv<W: Write, T: Serialize>(writer: W, records: impl IntoIterator<Item = T>) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in records {
        wtr.serialize(record).map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> EngineError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => EngineError::Io(io),
        other => EngineError::invalid_input("csv export", format!("{:?}", other)),
    }
}

pub fn write_segment_results_csv<W: Write>(writer: W, results: &[SegmentResult]) -> Result<()> {
    write_csv(writer, results.iter().map(SegmentRecord::from))
}

pub fn write_zone_results_csv<W: Write>(writer: W, results: &[ZoneResult]) -> Result<()> {
    write_csv(writer, results.iter().map(ZoneRecord::from))
}

pub fn evaluation_to_json(evaluation: &Evaluation) -> Result<String> {
    Ok(serde_json::to_string_pretty(evaluation)?)
}

/// Writes `segment_results.csv`, `zone_results.csv` and `evaluation.json` into `dir`.
pub fn export_evaluation(dir: impl AsRef<Path>, evaluation: &Evaluation) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    write_segment_results_csv(File::create(dir.join("segment_results.csv"))?, &evaluation.segments)?;
    write_zone_results_csv(File::create(dir.join("zone_results.csv"))?, &evaluation.zones)?;
    std::fs::write(dir.join("evaluation.json"), evaluation_to_json(evaluation)?)?;
    log::info!("[Export] Wrote results to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::evaluation::evaluate_network;
    use crate::network_model::tests::line_records;
    use crate::network_model::CorridorNetwork;

    fn evaluation() -> Evaluation {
        let config = EngineConfig::default();
        let network = CorridorNetwork::load(line_records(), &config.default_class_split).unwrap();
        evaluate_network(&network, &config).unwrap()
    }

    #[test]
    fn segment_csv_has_header_and_one_row_per_segment() {
        let eval = evaluation();
        let mut buf = Vec::new();
        write_segment_results_csv(&mut buf, &eval.segments).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("segment_id,zone_id,flow_vph"));
        assert!(lines[1].starts_with("AB,Z1,1000"));
    }

    #[test]
    fn zone_csv_uses_category_labels() {
        let eval = evaluation();
        let mut buf = Vec::new();
        write_zone_results_csv(&mut buf, &eval.zones).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Z2,Zone Z2,10000"));
        assert!(text.contains(&eval.zones[0].category.to_string()));
        let header = text.lines().next().unwrap();
        assert!(header.ends_with("health_risk,affected_population,respiratory_symptoms_pct"));
        assert!(text.contains(&eval.zones[1].health.risk.to_string()));
    }

    #[test]
    fn json_round_trips_through_serde_value() {
        let eval = evaluation();
        let json = evaluation_to_json(&eval).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["zones"].as_array().unwrap().len(), 2);
        assert_eq!(value["segments"][0]["segment_id"], "AB");
    }

    #[test]
    fn export_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        export_evaluation(dir.path(), &evaluation()).unwrap();
        for name in ["segment_results.csv", "zone_results.csv", "evaluation.json"] {
            assert!(dir.path().join(name).exists(), "{}", name);
        }
    }
}
