use serde::Deserialize;
use staymate_types::{RoommatePost, RoommatePostId, RoommatePostStatus, RoommateSearch};

use crate::{ApiClient, ApiRequest, ClientError};

/// `/matches` has been served both as a bare list and as a page.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrPage {
    List(Vec<RoommatePost>),
    Page { content: Vec<RoommatePost> },
}

#[derive(Debug, Clone, Copy)]
pub struct RoommatesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> RoommatesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, post: &RoommatePost) -> Result<RoommatePost, ClientError> {
        if post.location.trim().is_empty() {
            return Err(ClientError::InvalidRequest("location is required".into()));
        }
        if post.budget < 0.0 {
            return Err(ClientError::InvalidRequest("budget must be positive".into()));
        }
        let req = ApiRequest::post("/api/roommates").json(post)?;
        self.client.send_json(req).await
    }

    pub async fn get(&self, id: RoommatePostId) -> Result<RoommatePost, ClientError> {
        self.client
            .send_json(ApiRequest::get(format!("/api/roommates/{id}")))
            .await
    }

    pub async fn search(&self, filters: &RoommateSearch) -> Result<Vec<RoommatePost>, ClientError> {
        let req = ApiRequest::get("/api/roommates").query_pairs(filters.to_query());
        self.client.send_json(req).await
    }

    pub async fn mine(&self) -> Result<Vec<RoommatePost>, ClientError> {
        self.client.send_json(ApiRequest::get("/api/roommates/my")).await
    }

    /// Posts ranked by compatibility with the current user.
    pub async fn matches(&self) -> Result<Vec<RoommatePost>, ClientError> {
        let body: ListOrPage = self
            .client
            .send_json(ApiRequest::get("/api/roommates/matches"))
            .await?;
        Ok(match body {
            ListOrPage::List(posts) | ListOrPage::Page { content: posts } => posts,
        })
    }

    pub async fn update(
        &self,
        id: RoommatePostId,
        post: &RoommatePost,
    ) -> Result<RoommatePost, ClientError> {
        let req = ApiRequest::put(format!("/api/roommates/{id}")).json(post)?;
        self.client.send_json(req).await
    }

    pub async fn delete(&self, id: RoommatePostId) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::delete(format!("/api/roommates/{id}")))
            .await
    }

    /// Every post (admin).
    pub async fn all(&self) -> Result<Vec<RoommatePost>, ClientError> {
        self.client.send_json(ApiRequest::get("/api/roommates/all")).await
    }

    /// Moderate a post (admin).
    pub async fn update_status(
        &self,
        id: RoommatePostId,
        status: RoommatePostStatus,
    ) -> Result<RoommatePost, ClientError> {
        if status == RoommatePostStatus::Unknown {
            return Err(ClientError::InvalidRequest("unknown roommate post status".into()));
        }
        let status = serde_json::to_value(status).map_err(ClientError::Encode)?;
        let req = ApiRequest::put(format!("/api/roommates/{id}/status"))
            .query_opt("status", status.as_str());
        self.client.send_json(req).await
    }
}
