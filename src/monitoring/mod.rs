pub mod export;

pub use export::{evaluation_to_json, export_evaluation, write_segment_results_csv, write_zone_results_csv};
