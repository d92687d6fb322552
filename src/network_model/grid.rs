use crate::errors::Result;
use crate::global_variables::BASE_LANE_CAPACITY_VPH;
use crate::network_model::vehicles::ClassValues;
use crate::network_model::{
    CorridorNetwork, IntersectionRecord, NetworkRecords, OdRecord, SegmentRecord, ZoneRecord,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Grid spacing in degrees (about 1.1 km north-south).
const GRID_SPACING_DEG: f64 = 0.01;
const ORIGIN_LAT: f64 = 28.55;
const ORIGIN_LNG: f64 = 77.15;

fn node_id(row: usize, col: usize) -> String {
    format!("N{}_{}", row, col)
}

/// Builds the raw tables for a `rows` x `cols` grid corridor.
/// Every neighbouring pair is joined by two opposing two-lane segments.
/// Each row is its own zone. OD demand is drawn from `seed`, so the same
/// arguments always produce the same tables.
pub fn grid_records(rows: usize, cols: usize, seed: u64) -> NetworkRecords {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = NetworkRecords::default();

    // --- Intersections ---
    for row in 0..rows {
        for col in 0..cols {
            // Alternate signalised and priority junctions.
            let signalised = (row + col) % 2 == 0;
            let (cycle, green) = if signalised { (90.0, 40.0) } else { (0.0, 0.0) };
            records.intersections.push(IntersectionRecord {
                id: node_id(row, col),
                lat: ORIGIN_LAT + row as f64 * GRID_SPACING_DEG,
                lng: ORIGIN_LNG + col as f64 * GRID_SPACING_DEG,
                cycle_s: cycle,
                green_ns_s: green,
                green_ew_s: green,
            });
        }
    }

    // --- Zones ---
    for row in 0..rows {
        records.zones.push(ZoneRecord {
            id: format!("Z{}", row),
            name: format!("Row {}", row),
            population: rng.random_range(50_000..250_000),
        });
    }

    // --- Segments: horizontal then vertical, both directions ---
    let push_pair = |records: &mut NetworkRecords, a: (usize, usize), b: (usize, usize), length_km: f64| {
        for (from, to) in [(a, b), (b, a)] {
            records.segments.push(SegmentRecord {
                id: format!("{}-{}", node_id(from.0, from.1), node_id(to.0, to.1)),
                origin: node_id(from.0, from.1),
                destination: node_id(to.0, to.1),
                zone: format!("Z{}", from.0),
                length_km,
                lanes: 2,
                free_speed_kmh: 50.0,
                capacity_vph: 2.0 * BASE_LANE_CAPACITY_VPH,
                road_class: Some("arterial".to_string()),
                name: None,
            });
        }
    };
    for row in 0..rows {
        for col in 0..cols.saturating_sub(1) {
            push_pair(&mut records, (row, col), (row, col + 1), 0.98);
        }
    }
    for col in 0..cols {
        for row in 0..rows.saturating_sub(1) {
            push_pair(&mut records, (row, col), (row + 1, col), 1.11);
        }
    }

    // --- Demand ---
    let node_count = rows * cols;
    if node_count >= 2 {
        for _ in 0..node_count {
            let origin = rng.random_range(0..node_count);
            let mut destination = rng.random_range(0..node_count);
            if destination == origin {
                destination = (origin + 1) % node_count;
            }
            records.od_pairs.push(OdRecord {
                origin: node_id(origin / cols, origin % cols),
                destination: node_id(destination / cols, destination % cols),
                demand_vph: rng.random_range(100.0..600.0),
                vehicle_class: "mixed".to_string(),
            });
        }
    }

    records
}

/// Generates and loads a synthetic grid corridor.
pub fn generate_grid(rows: usize, cols: usize, seed: u64, default_split: &ClassValues) -> Result<CorridorNetwork> {
    log::debug!("[Grid] Generating {}x{} grid (seed {})", rows, cols, seed);
    CorridorNetwork::load(grid_records(rows, cols, seed), default_split)
}
