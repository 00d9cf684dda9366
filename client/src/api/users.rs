use staymate_types::{
    HasRoleResponse, MessageAck, PublicProfile, Role, UpdateProfileRequest, User, UserId,
};

use crate::{ApiClient, ApiRequest, ClientError};

/// Shorter (trimmed) search queries return no results without a request.
pub const MIN_SEARCH_CHARS: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> Result<User, ClientError> {
        self.client.send_json(ApiRequest::get("/api/users/profile")).await
    }

    pub async fn update_profile(&self, updates: &UpdateProfileRequest) -> Result<User, ClientError> {
        let req = ApiRequest::put("/api/users/profile").json(updates)?;
        self.client.send_json(req).await
    }

    pub async fn delete_account(&self) -> Result<MessageAck, ClientError> {
        self.client
            .send_json(ApiRequest::delete("/api/users/profile"))
            .await
    }

    /// `role` is sent without the `ROLE_` prefix.
    pub async fn has_role(&self, role: Role) -> Result<bool, ClientError> {
        let name = role.as_authority().trim_start_matches("ROLE_");
        let resp: HasRoleResponse = self
            .client
            .send_json(ApiRequest::get(format!("/api/users/has-role/{name}")))
            .await?;
        Ok(resp.has_role)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<User>, ClientError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }
        let req = ApiRequest::get("/api/users/search").query("query", query);
        self.client.send_json(req).await
    }

    pub async fn public_profile(&self, id: UserId) -> Result<PublicProfile, ClientError> {
        self.client
            .send_json(ApiRequest::get(format!("/api/users/public/{id}")))
            .await
    }
}
