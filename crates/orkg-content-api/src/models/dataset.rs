//! Dataset and benchmark summary representations.

use serde::{Deserialize, Serialize};

use super::common::{LabeledObject, ThingId};

/// A dataset and its aggregate usage counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: ThingId,
    pub label: String,
    pub total_papers: u64,
    pub total_models: u64,
    pub total_codes: u64,
}

/// Benchmark aggregate for one research problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub research_problem: LabeledObject,
    #[serde(default)]
    pub research_fields: Vec<LabeledObject>,
    pub total_papers: u64,
    pub total_datasets: u64,
    pub total_codes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benchmark_summary_counts() {
        let summary = BenchmarkSummary {
            research_problem: LabeledObject {
                id: ThingId::new("R123").unwrap(),
                label: "Problem 1".to_string(),
            },
            research_fields: vec![],
            total_papers: 1,
            total_datasets: 2,
            total_codes: 5,
        };
        let value = serde_json::to_value(summary).unwrap();
        assert_eq!(value["research_problem"]["id"], "R123");
        assert_eq!(value["total_datasets"], 2);
    }
}
