//! Roommate posts and compatibility matches.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{RoommatePostId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoommatePostStatus {
    Pending,
    Approved,
    Rejected,
    Closed,
    #[serde(other)]
    Unknown,
}

/// A roommate post. The backend uses the same shape for create, update and
/// read; server-owned fields are skipped when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoommatePost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RoommatePostId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_in_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pets: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    /// `CleanlinessLevel` on the server; kept as text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanliness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personality_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub status: Option<RoommatePostStatus>,
    /// 0-100, only on match results.
    #[serde(default, skip_serializing)]
    pub match_score: Option<u32>,
    #[serde(default, skip_serializing)]
    pub match_explanation: Option<String>,
    #[serde(default, rename = "isSaved", alias = "saved", skip_serializing)]
    pub saved: bool,
}

/// Filters for `GET /api/roommates`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoommateSearch {
    pub location: Option<String>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    pub gender_preference: Option<String>,
}

impl RoommateSearch {
    /// Query pairs, with blank text filters dropped.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let mut query = Vec::new();
        if let Some(location) = text(&self.location) {
            query.push(("location", location));
        }
        if let Some(min) = self.min_budget {
            query.push(("minBudget", min.to_string()));
        }
        if let Some(max) = self.max_budget {
            query.push(("maxBudget", max.to_string()));
        }
        if let Some(gender) = text(&self.gender_preference) {
            query.push(("genderPreference", gender));
        }
        query
    }
}
