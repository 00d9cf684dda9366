use staymate_types::{AdminDashboard, DashboardStats, LandlordDashboard, UserDashboard};

use crate::{ApiClient, ApiRequest, ClientError};

#[derive(Debug, Clone, Copy)]
pub struct DashboardApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DashboardApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> Result<DashboardStats, ClientError> {
        self.client.send_json(ApiRequest::get("/api/dashboard/stats")).await
    }

    pub async fn admin(&self) -> Result<AdminDashboard, ClientError> {
        self.client.send_json(ApiRequest::get("/api/dashboard/admin")).await
    }

    pub async fn landlord(&self) -> Result<LandlordDashboard, ClientError> {
        self.client
            .send_json(ApiRequest::get("/api/dashboard/landlord"))
            .await
    }

    pub async fn user(&self) -> Result<UserDashboard, ClientError> {
        self.client.send_json(ApiRequest::get("/api/dashboard/user")).await
    }
}
