use staymate_types::{BookingId, BookingRequest, BookingResponse, BookingStatus, Page, PageRequest};

use crate::{ApiClient, ApiRequest, ClientError};

#[derive(Debug, Clone, Copy)]
pub struct BookingsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> BookingsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, request: &BookingRequest) -> Result<BookingResponse, ClientError> {
        if request.end_date < request.start_date {
            return Err(ClientError::InvalidRequest(
                "end date is before start date".into(),
            ));
        }
        let req = ApiRequest::post("/api/bookings").json(request)?;
        self.client.send_json(req).await
    }

    /// Bookings made by the current user.
    pub async fn mine(&self, page: PageRequest) -> Result<Page<BookingResponse>, ClientError> {
        let req = ApiRequest::get("/api/bookings/my-bookings").query_pairs(page.to_query());
        self.client.send_json(req).await
    }

    /// Bookings on the current user's listings.
    pub async fn requests(&self, page: PageRequest) -> Result<Page<BookingResponse>, ClientError> {
        let req = ApiRequest::get("/api/bookings/requests").query_pairs(page.to_query());
        self.client.send_json(req).await
    }

    pub async fn update_status(
        &self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<BookingResponse, ClientError> {
        if status == BookingStatus::Unknown {
            return Err(ClientError::InvalidRequest("unknown booking status".into()));
        }
        let req = ApiRequest::patch(format!("/api/bookings/{id}/status"))
            .query("status", status.as_str());
        self.client.send_json(req).await
    }

    pub async fn delete(&self, id: BookingId) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::delete(format!("/api/bookings/{id}")))
            .await
    }

    pub async fn check_in(&self, id: BookingId) -> Result<BookingResponse, ClientError> {
        self.client
            .send_json(ApiRequest::post(format!("/api/bookings/{id}/check-in")))
            .await
    }

    pub async fn check_out(&self, id: BookingId) -> Result<BookingResponse, ClientError> {
        self.client
            .send_json(ApiRequest::post(format!("/api/bookings/{id}/check-out")))
            .await
    }
}
