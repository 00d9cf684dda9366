//! Listings and amenities.

use serde::{Deserialize, Serialize};

use crate::{AmenityId, PropertyId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    Pending,
    Approved,
    Active,
    Inactive,
    Rented,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl PropertyStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Rented => "RENTED",
            Self::Rejected => "REJECTED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::str::FromStr for PropertyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            "RENTED" => Ok(Self::Rented),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(format!("unknown property status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amenity {
    pub id: AmenityId,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    pub id: PropertyId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Pre-formatted price label, e.g. `"$1,200/mo"`.
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub price_amount: Option<f64>,
    #[serde(default)]
    pub beds: u32,
    #[serde(default)]
    pub baths: u32,
    #[serde(default)]
    pub sqft: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reviews_count: u32,
    #[serde(default)]
    pub views: u32,
    #[serde(default)]
    pub inquiries: u32,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    #[serde(default)]
    pub is_saved: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baths: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenity_ids: Vec<AmenityId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// Filters for `GET /api/properties/search`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySearch {
    pub query: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_beds: Option<u32>,
    pub min_baths: Option<u32>,
    pub property_type: Option<String>,
    pub amenity_ids: Vec<AmenityId>,
}

impl PropertySearch {
    /// Query-string pairs in the backend's parameter names.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(q) = self.query.as_deref().map(str::trim)
            && !q.is_empty()
        {
            out.push(("query", q.to_string()));
        }
        if let Some(v) = self.min_price {
            out.push(("minPrice", v.to_string()));
        }
        if let Some(v) = self.max_price {
            out.push(("maxPrice", v.to_string()));
        }
        if let Some(v) = self.min_beds {
            out.push(("minBeds", v.to_string()));
        }
        if let Some(v) = self.min_baths {
            out.push(("minBaths", v.to_string()));
        }
        if let Some(v) = &self.property_type {
            out.push(("propertyType", v.clone()));
        }
        for id in &self.amenity_ids {
            out.push(("amenityIds", id.to_string()));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCheck {
    #[serde(default)]
    pub available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_skips_unset_and_blank_fields() {
        let search = PropertySearch {
            query: Some("  ".into()),
            min_beds: Some(2),
            amenity_ids: vec![AmenityId::new(1), AmenityId::new(3)],
            ..PropertySearch::default()
        };
        assert_eq!(
            search.to_query(),
            vec![
                ("minBeds", "2".to_string()),
                ("amenityIds", "1".to_string()),
                ("amenityIds", "3".to_string()),
            ]
        );
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("rented".parse::<PropertyStatus>(), Ok(PropertyStatus::Rented));
        assert!("gone".parse::<PropertyStatus>().is_err());
    }

    #[test]
    fn sparse_property_decodes() {
        let p: PropertyResponse =
            serde_json::from_str(r#"{"id":5,"title":"Loft","beds":2,"extra":"ignored"}"#).unwrap();
        assert_eq!(p.beds, 2);
        assert!(p.amenities.is_empty());
    }
}
