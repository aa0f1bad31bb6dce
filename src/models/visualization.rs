use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::filters::DataFilters;

/// Episode count for one diagnostic category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeGroupCount {
    pub age_group: String,
    pub count: u64,
    pub percentage: f64,
}

/// Admissions in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// "YYYY-MM"
    pub period: String,
    pub count: u64,
}

impl TimeSeriesPoint {
    /// First day of the period's month, if the period is well formed.
    pub fn month_start(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&format!("{}-01", self.period), "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderCount {
    pub gender: String,
    pub count: u64,
    pub percentage: f64,
}

/// Episodes per length-of-stay bucket ("< 3 días", "3-7 días", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StayCount {
    pub stay_range: String,
    pub count: u64,
    pub percentage: f64,
}

/// Response of `GET /data/visualization`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataVisualization {
    pub total_records: u64,
    #[serde(default)]
    pub categories: Vec<CategoryCount>,
    #[serde(default)]
    pub age_groups: Vec<AgeGroupCount>,
    #[serde(default)]
    pub time_series: Vec<TimeSeriesPoint>,
    #[serde(default)]
    pub gender_distribution: Vec<GenderCount>,
    #[serde(default)]
    pub stay_distribution: Vec<StayCount>,
    #[serde(default)]
    pub filters_applied: DataFilters,
}

impl DataVisualization {
    pub fn category(&self, name: &str) -> Option<&CategoryCount> {
        self.categories.iter().find(|c| c.category == name)
    }

    /// The category with the most episodes. Ties go to the first listed.
    pub fn dominant_category(&self) -> Option<&CategoryCount> {
        self.categories
            .iter()
            .rev()
            .max_by_key(|c| c.count)
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

/// Response of `GET /data/categories`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<String>,
    #[serde(default)]
    pub total: usize,
}

impl CategoryList {
    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}
