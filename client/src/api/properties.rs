use chrono::NaiveDate;
use staymate_types::{
    Amenity, AvailabilityCheck, PropertyId, PropertyRequest, PropertyResponse, PropertySearch,
    PropertyStatus,
};

use crate::{ApiClient, ApiRequest, ClientError};

/// Create and update take a multipart form whose `data` part is the JSON
/// listing.
const LISTING_PART: &str = "data";

#[derive(Debug, Clone, Copy)]
pub struct PropertiesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PropertiesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Listings owned by the current user.
    pub async fn mine(&self) -> Result<Vec<PropertyResponse>, ClientError> {
        self.client
            .send_json(ApiRequest::get("/api/properties/my-properties"))
            .await
    }

    pub async fn my_details(&self, id: PropertyId) -> Result<PropertyResponse, ClientError> {
        self.client
            .send_json(ApiRequest::get(format!("/api/properties/my-properties/{id}")))
            .await
    }

    pub async fn create(&self, listing: &PropertyRequest) -> Result<PropertyResponse, ClientError> {
        let req = ApiRequest::post("/api/properties").json_part(LISTING_PART, listing)?;
        self.client.send_json(req).await
    }

    pub async fn recommended(&self) -> Result<Vec<PropertyResponse>, ClientError> {
        self.client
            .send_json(ApiRequest::get("/api/properties/recommended"))
            .await
    }

    pub async fn search(&self, search: &PropertySearch) -> Result<Vec<PropertyResponse>, ClientError> {
        let req = ApiRequest::get("/api/properties/search").query_pairs(search.to_query());
        self.client.send_json(req).await
    }

    pub async fn get(&self, id: PropertyId) -> Result<PropertyResponse, ClientError> {
        self.client
            .send_json(ApiRequest::get(format!("/api/properties/{id}")))
            .await
    }

    pub async fn update_status(
        &self,
        id: PropertyId,
        status: PropertyStatus,
    ) -> Result<PropertyResponse, ClientError> {
        if status == PropertyStatus::Unknown {
            return Err(ClientError::InvalidRequest("unknown property status".into()));
        }
        let req = ApiRequest::patch(format!("/api/properties/{id}/status"))
            .query("status", status.as_str());
        self.client.send_json(req).await
    }

    pub async fn update(
        &self,
        id: PropertyId,
        listing: &PropertyRequest,
    ) -> Result<PropertyResponse, ClientError> {
        let req = ApiRequest::put(format!("/api/properties/{id}")).json_part(LISTING_PART, listing)?;
        self.client.send_json(req).await
    }

    pub async fn delete(&self, id: PropertyId) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::delete(format!("/api/properties/{id}")))
            .await
    }

    pub async fn amenities(&self) -> Result<Vec<Amenity>, ClientError> {
        self.client.send_json(ApiRequest::get("/api/amenities")).await
    }

    pub async fn check_availability(
        &self,
        id: PropertyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, ClientError> {
        if end < start {
            return Err(ClientError::InvalidRequest(
                "end date is before start date".into(),
            ));
        }
        let req = ApiRequest::get(format!("/api/properties/{id}/availability/check"))
            .query("startDate", start)
            .query("endDate", end);
        let check: AvailabilityCheck = self.client.send_json(req).await?;
        Ok(check.available)
    }
}
