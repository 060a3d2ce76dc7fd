//! Parallel universe analysis payload.
//!
//! The analysis is produced by a language model, so field types drift
//! (`"N/A"` next to numbers, nulls for strings). Every display string is
//! read leniently: strings as-is, numbers and booleans as their text, null
//! or missing as empty. Optional numbers and sections that arrive with the
//! wrong shape are read as absent instead of rejecting the payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    })
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
        .map(|n| n as u64))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(lenient_string(deserializer)?).filter(|s| !s.is_empty()))
}

fn lenient_section<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub analysis_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub data_period: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_decisions_analyzed: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub universes_generated: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ActualJourney {
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub starting_net_worth: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub current_net_worth: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wealth_created: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cagr: String,
}

/// One real historical decision.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct KeyDecision {
    #[serde(default, deserialize_with = "lenient_string")]
    pub decision_id: String,
    /// `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub current_value: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub roi: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub decision_quality_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub market_context: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FinancialTimeline {
    #[serde(default)]
    pub actual_journey: ActualJourney,
    #[serde(default)]
    pub key_decisions: Vec<KeyDecision>,
}

/// A simulated alternative outcome.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AlternativeUniverse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub universe_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub final_net_worth: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wealth_difference: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub key_characteristics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TransformationPotential {
    #[serde(default, deserialize_with = "lenient_string")]
    pub from_current: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub to_optimal: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub improvement: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timeline: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SummaryInsights {
    #[serde(default, deserialize_with = "lenient_text")]
    pub overall_performance: Option<String>,
    #[serde(default, deserialize_with = "lenient_section")]
    pub transformation_potential: Option<TransformationPotential>,
}

/// The complete analysis.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TimelineData {
    #[serde(default)]
    pub metadata: Metadata,
    pub financial_timeline: FinancialTimeline,
    pub alternative_universes: Vec<AlternativeUniverse>,
    #[serde(default)]
    pub summary_insights: SummaryInsights,
}

/// The analysis payload lacks the required sections.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid analysis payload: {0}")]
pub struct InvalidData(pub String);

fn is_present(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

impl TimelineData {
    /// Read the `data` of a completed analysis, unwrapping
    /// `parallel_universe_analysis` when the payload nests it.
    pub fn from_analysis(data: Value) -> Result<Self, InvalidData> {
        let data = match data {
            Value::Object(mut map) if is_present(map.get("parallel_universe_analysis")) => map
                .remove("parallel_universe_analysis")
                .unwrap_or(Value::Null),
            other => other,
        };

        if !is_present(data.get("financial_timeline")) || !is_present(data.get("alternative_universes")) {
            return Err(InvalidData(
                "missing financial_timeline or alternative_universes".to_string(),
            ));
        }

        serde_json::from_value(data).map_err(|e| InvalidData(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "financial_timeline": {
                "actual_journey": {"current_net_worth": "₹12,97,285"},
                "key_decisions": []
            },
            "alternative_universes": []
        })
    }

    #[test]
    fn test_plain_payload() {
        let data = TimelineData::from_analysis(minimal()).unwrap();
        assert_eq!(data.financial_timeline.actual_journey.current_net_worth, "₹12,97,285");
        assert!(data.summary_insights.transformation_potential.is_none());
    }

    #[test]
    fn test_nested_payload_is_unwrapped() {
        let data = TimelineData::from_analysis(json!({"parallel_universe_analysis": minimal()})).unwrap();
        assert!(data.alternative_universes.is_empty());
    }

    #[test]
    fn test_missing_sections_rejected() {
        assert!(TimelineData::from_analysis(json!({"financial_timeline": {}})).is_err());
        assert!(TimelineData::from_analysis(json!({
            "financial_timeline": {}, "alternative_universes": null
        }))
        .is_err());
        assert!(TimelineData::from_analysis(json!("text")).is_err());
    }

    #[test]
    fn test_lenient_fields() {
        let data = TimelineData::from_analysis(json!({
            "financial_timeline": {
                "actual_journey": {"current_net_worth": 1297285, "cagr": null},
                "key_decisions": [{"date": "2022-03-09", "amount": 10027, "roi": "N/A"}]
            },
            "alternative_universes": [{"name": "Bold", "key_characteristics": ["a", 3, null]}]
        }))
        .unwrap();

        let journey = &data.financial_timeline.actual_journey;
        assert_eq!(journey.current_net_worth, "1297285");
        assert_eq!(journey.cagr, "");
        assert_eq!(data.financial_timeline.key_decisions[0].amount, "10027");
        assert_eq!(data.financial_timeline.key_decisions[0].description, "");
        assert_eq!(data.alternative_universes[0].key_characteristics, vec!["a", "3"]);
    }

    #[test]
    fn test_mistyped_optional_fields_read_as_absent() {
        let data = TimelineData::from_analysis(json!({
            "metadata": {"total_decisions_analyzed": "15", "universes_generated": "four"},
            "financial_timeline": {
                "key_decisions": [
                    {"description": "Bought index fund", "decision_quality_score": "N/A"},
                    {"description": "Paid off loan", "decision_quality_score": "7.5"}
                ]
            },
            "alternative_universes": [],
            "summary_insights": {
                "overall_performance": 7.5,
                "transformation_potential": "significant"
            }
        }))
        .unwrap();

        assert_eq!(data.metadata.total_decisions_analyzed, Some(15));
        assert_eq!(data.metadata.universes_generated, None);
        let decisions = &data.financial_timeline.key_decisions;
        assert_eq!(decisions[0].decision_quality_score, None);
        assert_eq!(decisions[1].decision_quality_score, Some(7.5));
        assert_eq!(data.summary_insights.overall_performance.as_deref(), Some("7.5"));
        assert!(data.summary_insights.transformation_potential.is_none());
    }

    #[test]
    fn test_null_summary_fields() {
        let data = TimelineData::from_analysis(json!({
            "metadata": {"total_decisions_analyzed": -2, "universes_generated": 4.0},
            "financial_timeline": {},
            "alternative_universes": [],
            "summary_insights": {"overall_performance": null, "transformation_potential": null}
        }))
        .unwrap();

        assert_eq!(data.metadata.total_decisions_analyzed, None);
        assert_eq!(data.metadata.universes_generated, Some(4));
        assert_eq!(data.summary_insights, SummaryInsights::default());
    }
}
