use staymate_types::{
    AdminStats, AuditLogEntry, DeletionRequest, FraudEvent, FraudScan, MessageAck, Page,
    PageRequest, User, UserId,
};

use crate::{ApiClient, ApiRequest, ClientError};

/// Filters for the audit log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLogQuery {
    pub user_id: Option<UserId>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> Result<AdminStats, ClientError> {
        self.client.send_json(ApiRequest::get("/api/admin/stats")).await
    }

    pub async fn users(&self) -> Result<Vec<User>, ClientError> {
        self.client.send_json(ApiRequest::get("/api/admin/users")).await
    }

    pub async fn user(&self, id: UserId) -> Result<User, ClientError> {
        self.client
            .send_json(ApiRequest::get(format!("/api/admin/users/{id}")))
            .await
    }

    pub async fn promote_to_house_owner(&self, id: UserId) -> Result<User, ClientError> {
        self.user_action(id, "promote/house-owner").await
    }

    pub async fn promote_to_admin(&self, id: UserId) -> Result<User, ClientError> {
        self.user_action(id, "promote/admin").await
    }

    pub async fn demote_from_house_owner(&self, id: UserId) -> Result<User, ClientError> {
        self.user_action(id, "demote/house-owner").await
    }

    pub async fn demote_from_admin(&self, id: UserId) -> Result<User, ClientError> {
        self.user_action(id, "demote/admin").await
    }

    pub async fn enable_user(&self, id: UserId) -> Result<User, ClientError> {
        self.user_action(id, "enable").await
    }

    pub async fn disable_user(&self, id: UserId) -> Result<User, ClientError> {
        self.user_action(id, "disable").await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<MessageAck, ClientError> {
        self.client
            .send_json(ApiRequest::delete(format!("/api/admin/users/{id}")))
            .await
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<User>, ClientError> {
        let req = ApiRequest::get("/api/admin/users/search").query("query", query.trim());
        self.client.send_json(req).await
    }

    /// Schedule the account for deletion after the backend's grace period.
    pub async fn schedule_deletion(&self, id: UserId, reason: &str) -> Result<MessageAck, ClientError> {
        let req = ApiRequest::post(format!("/api/admin/users/{id}/delete-request")).json(
            &DeletionRequest {
                reason: reason.trim().to_string(),
            },
        )?;
        self.client.send_json(req).await
    }

    pub async fn cancel_deletion(&self, id: UserId) -> Result<MessageAck, ClientError> {
        self.client
            .send_json(ApiRequest::post(format!("/api/admin/users/{id}/cancel-delete")))
            .await
    }

    pub async fn audit_logs(
        &self,
        filter: &AuditLogQuery,
        page: PageRequest,
    ) -> Result<Page<AuditLogEntry>, ClientError> {
        let req = ApiRequest::get("/api/admin/audit-logs")
            .query_pairs(page.to_query())
            .query_opt("userId", filter.user_id)
            .query_opt("action", filter.action.as_deref())
            .query_opt("entityType", filter.entity_type.as_deref());
        self.client.send_json(req).await
    }

    pub async fn fraud_events(&self) -> Result<Vec<FraudEvent>, ClientError> {
        self.client
            .send_json(ApiRequest::get("/api/admin/fraud/events"))
            .await
    }

    pub async fn fraud_scan(&self, scan: FraudScan) -> Result<MessageAck, ClientError> {
        let path = format!("/api/admin/fraud/scan/{}", scan.path_segment());
        self.client.send_json(ApiRequest::post(path)).await
    }

    async fn user_action(&self, id: UserId, action: &str) -> Result<User, ClientError> {
        self.client
            .send_json(ApiRequest::post(format!("/api/admin/users/{id}/{action}")))
            .await
    }
}
