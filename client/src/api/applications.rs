use staymate_types::{
    ApplicationId, ApplicationRequest, ApplicationResponse, ApplicationStatus, Page, PageRequest,
};

use crate::{ApiClient, ApiRequest, ClientError};

#[derive(Debug, Clone, Copy)]
pub struct ApplicationsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ApplicationsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn send(
        &self,
        request: &ApplicationRequest,
    ) -> Result<ApplicationResponse, ClientError> {
        let req = ApiRequest::post("/api/applications").json(request)?;
        self.client.send_json(req).await
    }

    /// Applications the current user sent.
    pub async fn sent(&self, page: PageRequest) -> Result<Page<ApplicationResponse>, ClientError> {
        let req = ApiRequest::get("/api/applications/sent").query_pairs(page.to_query());
        self.client.send_json(req).await
    }

    /// Applications on the current user's listings.
    pub async fn received(
        &self,
        page: PageRequest,
    ) -> Result<Page<ApplicationResponse>, ClientError> {
        let req = ApiRequest::get("/api/applications/received").query_pairs(page.to_query());
        self.client.send_json(req).await
    }

    /// Accept or reject a received application, or cancel a sent one.
    pub async fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<ApplicationResponse, ClientError> {
        if matches!(status, ApplicationStatus::Unknown | ApplicationStatus::Pending) {
            return Err(ClientError::InvalidRequest(format!(
                "cannot move an application to {status}"
            )));
        }
        let req = ApiRequest::patch(format!("/api/applications/{id}/status"))
            .query("status", status.as_str());
        self.client.send_json(req).await
    }

    pub async fn delete(&self, id: ApplicationId) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::delete(format!("/api/applications/{id}")))
            .await
    }
}
