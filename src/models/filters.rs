//! Query filters for `GET /data/visualization`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BrainError, BrainResult};

/// Patient sex as coded in the admissions dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn code(self) -> u8 {
        match self {
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }
}

impl From<Gender> for u8 {
    fn from(gender: Gender) -> Self {
        gender.code()
    }
}

impl TryFrom<u8> for Gender {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Gender::Male),
            2 => Ok(Gender::Female),
            other => Err(format!("unknown gender code {}", other)),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "male" | "m" | "hombre" => Ok(Gender::Male),
            "2" | "female" | "f" | "mujer" => Ok(Gender::Female),
            other => Err(format!("unknown gender '{}', expected male/female or 1/2", other)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// Optional filters. Unset fields are left out of the query string.
///
/// The backend echoes the applied filters back in
/// [`DataVisualization::filters_applied`](super::DataVisualization).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readmission: Option<bool>,
}

impl DataFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_age_range(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.age_min = min;
        self.age_max = max;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_readmission(mut self, readmission: bool) -> Self {
        self.readmission = Some(readmission);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject inverted ranges and blank categories.
    pub fn validate(&self) -> BrainResult<()> {
        if let (Some(min), Some(max)) = (self.age_min, self.age_max) {
            if min > max {
                return Err(BrainError::invalid_input(
                    "age_min",
                    format!("minimum age {} is greater than maximum age {}", min, max),
                ));
            }
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(BrainError::invalid_input(
                    "start_date",
                    format!("start date {} is after end date {}", start, end),
                ));
            }
        }
        if matches!(&self.category, Some(c) if c.trim().is_empty()) {
            return Err(BrainError::invalid_input("category", "must not be blank"));
        }
        Ok(())
    }

    /// Percent-encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        if let Some(date) = self.start_date {
            pairs.push(("start_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.end_date {
            pairs.push(("end_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(gender) = self.gender {
            pairs.push(("gender", gender.code().to_string()));
        }
        if let Some(age) = self.age_min {
            pairs.push(("age_min", age.to_string()));
        }
        if let Some(age) = self.age_max {
            pairs.push(("age_max", age.to_string()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(readmission) = self.readmission {
            pairs.push(("readmission", readmission.to_string()));
        }

        pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_filters() {
        let filters = DataFilters::new();
        assert!(filters.is_empty());
        assert_eq!(filters.to_query_string(), "");
        assert!(filters.validate().is_ok());
    }

    #[test]
    fn test_query_string_order_and_encoding() {
        let filters = DataFilters::new()
            .with_start_date(date("2018-01-01"))
            .with_end_date(date("2018-12-31"))
            .with_gender(Gender::Female)
            .with_age_range(Some(18), Some(65))
            .with_category("Trastornos del humor [afectivos]")
            .with_readmission(true);

        assert_eq!(
            filters.to_query_string(),
            "start_date=2018-01-01&end_date=2018-12-31&gender=2&age_min=18&age_max=65\
             &category=Trastornos%20del%20humor%20%5Bafectivos%5D&readmission=true"
        );
    }

    #[test]
    fn test_query_string_encodes_reserved_characters() {
        let filters = DataFilters::new().with_category("Esquizofrenia & psicosis");
        assert_eq!(
            filters.to_query_string(),
            "category=Esquizofrenia%20%26%20psicosis"
        );
    }

    #[test]
    fn test_validate_rejects_inverted_ranges() {
        let ages = DataFilters::new().with_age_range(Some(70), Some(20));
        let err = ages.validate().unwrap_err();
        assert_eq!(err.error_code(), "E_INPUT");

        let dates = DataFilters::new()
            .with_start_date(date("2019-06-01"))
            .with_end_date(date("2019-01-01"));
        assert!(dates.validate().is_err());

        let equal = DataFilters::new().with_age_range(Some(30), Some(30));
        assert!(equal.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_category() {
        assert!(DataFilters::new().with_category("  ").validate().is_err());
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "1");
        assert_eq!(serde_json::from_str::<Gender>("2").unwrap(), Gender::Female);
        assert!(serde_json::from_str::<Gender>("3").is_err());
        assert_eq!("Mujer".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("1".parse::<Gender>().unwrap(), Gender::Male);
        assert!("x".parse::<Gender>().is_err());
    }

    #[test]
    fn test_deserialize_echoed_filters() {
        let filters: DataFilters = serde_json::from_str(
            r#"{"start_date":"2017-03-01","end_date":null,"gender":1,"age_min":null,"age_max":null,"category":null,"readmission":false}"#,
        )
        .unwrap();
        assert_eq!(filters.start_date, Some(date("2017-03-01")));
        assert_eq!(filters.gender, Some(Gender::Male));
        assert_eq!(filters.readmission, Some(false));
        assert!(filters.end_date.is_none());
    }
}
