use serde::{Deserialize, Serialize};

/// Reporting boundary. Membership is filled in from the segment table at load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub population: u64,
    /// Member segment indexes, in load order.
    pub segments: Vec<usize>,
}

impl Zone {
    pub fn new(id: &str, name: &str, population: u64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            population,
            segments: Vec::new(),
        }
    }
}
