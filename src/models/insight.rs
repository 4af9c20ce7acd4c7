//! Spending summaries behind the insight charts.

use serde::{Deserialize, Deserializer, Serialize};

/// Spending on one day of the weekly histogram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DaySpending {
    /// Day label as sent by the backend, e.g. `"10/14"`.
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub expense: f64,
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub income: f64,
}

/// Spending in one month of the yearly summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MonthlySpending {
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub expense: f64,
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub income: f64,
}

impl DaySpending {
    pub fn new(date: impl Into<String>, expense: f64, income: f64) -> Self {
        Self {
            date: date.into(),
            expense,
            income,
        }
    }
}

impl MonthlySpending {
    pub fn new(date: impl Into<String>, expense: f64, income: f64) -> Self {
        Self {
            date: date.into(),
            expense,
            income,
        }
    }
}

/// `"(first ~ last)"` over the days shown, or `""` for no days.
pub fn histogram_range(days: &[DaySpending]) -> String {
    match (days.first(), days.last()) {
        (Some(first), Some(last)) => format!("({} ~ {})", first.date, last.date),
        _ => String::new(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Figure {
    Number(f64),
    Text(String),
}

/// Sums arrive as JSON numbers or as decimal strings; `null` reads as zero.
fn deserialize_figure<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Figure>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Figure::Number(n)) => Ok(n),
        Some(Figure::Text(text)) if text.trim().is_empty() => Ok(0.0),
        Some(Figure::Text(text)) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_spans_first_and_last_day() {
        let days = vec![
            DaySpending::new("10/08", 120.0, 0.0),
            DaySpending::new("10/09", 0.0, 0.0),
            DaySpending::new("10/14", 35.5, 1000.0),
        ];
        assert_eq!(histogram_range(&days), "(10/08 ~ 10/14)");
        assert_eq!(histogram_range(&days[..1]), "(10/08 ~ 10/08)");
    }

    #[test]
    fn test_range_of_no_days_is_empty() {
        assert_eq!(histogram_range(&[]), "");
    }

    #[test]
    fn test_figures_from_numbers_or_strings() {
        let day: DaySpending =
            serde_json::from_str(r#"{"date": "10/14", "expense": "35.5", "income": 12}"#).unwrap();
        assert_eq!(day, DaySpending::new("10/14", 35.5, 12.0));

        let month: MonthlySpending = serde_json::from_str(r#"{"date": "2026-01"}"#).unwrap();
        assert_eq!(month, MonthlySpending::new("2026-01", 0.0, 0.0));

        assert!(serde_json::from_str::<DaySpending>(r#"{"expense": "lots"}"#).is_err());
    }
}
