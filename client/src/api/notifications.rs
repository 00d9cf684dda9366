use staymate_types::{
    NotificationDeleteRequest, NotificationFilter, NotificationId, NotificationListResponse,
    NotificationMarkAsReadRequest, NotificationResponse, NotificationSummary,
    NotificationUnreadCountResponse, PageRequest,
};

use crate::{ApiClient, ApiRequest, ClientError};

#[derive(Debug, Clone, Copy)]
pub struct NotificationsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> NotificationsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        page: PageRequest,
        filter: Option<NotificationFilter>,
    ) -> Result<NotificationListResponse, ClientError> {
        let req = ApiRequest::get("/api/notifications")
            .query_pairs(page.to_query())
            .query_opt("filter", filter.map(NotificationFilter::as_str));
        self.client.send_json(req).await
    }

    pub async fn get(&self, id: NotificationId) -> Result<NotificationResponse, ClientError> {
        self.client
            .send_json(ApiRequest::get(format!("/api/notifications/{id}")))
            .await
    }

    pub async fn unread_count(&self) -> Result<NotificationUnreadCountResponse, ClientError> {
        self.client
            .send_json(ApiRequest::get("/api/notifications/unread-count"))
            .await
    }

    pub async fn summary(&self) -> Result<NotificationSummary, ClientError> {
        self.client
            .send_json(ApiRequest::get("/api/notifications/summary"))
            .await
    }

    pub async fn mark_read(&self, request: &NotificationMarkAsReadRequest) -> Result<(), ClientError> {
        let req = ApiRequest::post("/api/notifications/mark-read").json(request)?;
        self.client.send_empty(req).await
    }

    pub async fn mark_one_read(&self, id: NotificationId) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::post(format!("/api/notifications/{id}/read")))
            .await
    }

    pub async fn mark_all_read(&self) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::post("/api/notifications/mark-all-read"))
            .await
    }

    /// Bulk delete; the selection travels in the DELETE body.
    pub async fn delete(&self, request: &NotificationDeleteRequest) -> Result<(), ClientError> {
        let req = ApiRequest::delete("/api/notifications").json(request)?;
        self.client.send_empty(req).await
    }

    pub async fn delete_one(&self, id: NotificationId) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::delete(format!("/api/notifications/{id}")))
            .await
    }

    /// Remove old read notifications.
    pub async fn cleanup(&self) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::delete("/api/notifications/cleanup"))
            .await
    }
}
