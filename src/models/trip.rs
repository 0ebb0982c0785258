use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItineraryRequest {
    #[serde(rename = "formData")]
    pub form_data: TripForm,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TripForm {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub days: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub travelers: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub budget: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Set by the "Plan B" swap flow to request a targeted change to an existing plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instruction: Option<String>,
}

impl TripForm {
    pub fn destination(&self) -> &str {
        self.destination.trim()
    }

    pub fn special_instruction(&self) -> Option<&str> {
        self.special_instruction
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// First and last calendar day of the trip, when `startDate` is an ISO date and
    /// `days` is a positive whole number.
    pub fn travel_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::parse_from_str(self.start_date.as_deref()?.trim(), "%Y-%m-%d").ok()?;
        let days: i64 = self.days.trim().parse().ok()?;
        if days < 1 {
            return None;
        }
        let end = start.checked_add_signed(Duration::try_days(days - 1)?)?;
        Some((start, end))
    }
}

/// Browser forms post numeric inputs as strings; accept either and keep the text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text.trim().to_string(),
        Raw::Number(number) => number.to_string(),
        Raw::Null => String::new(),
    })
}
