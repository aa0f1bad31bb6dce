use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single highlighted figure, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightMetric {
    pub title: String,
    pub value: String,
    pub description: String,
}

/// Metrics grouped under one research angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSection {
    pub title: String,
    pub metrics: Vec<InsightMetric>,
}

/// Response of `GET /insights`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSummary {
    pub generated_at: DateTime<Utc>,
    pub sample_period: String,
    pub highlight_phrases: Vec<String>,
    pub metric_sections: Vec<InsightSection>,
    pub database_connected: bool,
}

impl InsightSummary {
    /// Total number of metrics across all sections.
    pub fn metric_count(&self) -> usize {
        self.metric_sections.iter().map(|s| s.metrics.len()).sum()
    }

    /// Find a section by title, ignoring case.
    pub fn section(&self, title: &str) -> Option<&InsightSection> {
        let wanted = title.to_lowercase();
        self.metric_sections
            .iter()
            .find(|s| s.title.to_lowercase() == wanted)
    }
}
