use staymate_types::{
    AuthResponse, EmailAvailability, LoginRequest, RefreshToken, RegisterRequest,
    RoleSelectionRequest, SelectableRole, TokenRefreshRequest, TokenValidation, User,
};

use crate::{ApiClient, ApiRequest, ClientError};

/// Raw auth endpoints. They do not touch the token store; [`crate::Session`]
/// does that.
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let req = ApiRequest::post("/api/auth/register").json(request)?;
        self.client.send_json(req).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let req = ApiRequest::post("/api/auth/login").json(request)?;
        self.client.send_json(req).await
    }

    /// Exchange a refresh token directly. The client pipeline refreshes on
    /// its own; this is for callers managing tokens themselves.
    pub async fn refresh_token(&self, token: &RefreshToken) -> Result<AuthResponse, ClientError> {
        let body = TokenRefreshRequest {
            refresh_token: token.expose_secret().to_string(),
        };
        let req = ApiRequest::post("/api/auth/refresh-token").json(&body)?;
        self.client.send_json(req).await
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.client.send_json(ApiRequest::get("/api/auth/me")).await
    }

    /// Server-side logout. A 401 here is not worth a refresh.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let req = ApiRequest::post("/api/auth/logout").without_refresh();
        self.client.send_empty(req).await
    }

    pub async fn check_email(&self, email: &str) -> Result<EmailAvailability, ClientError> {
        let req = ApiRequest::get("/api/auth/check-email").query("email", email.trim());
        self.client.send_json(req).await
    }

    pub async fn validate(&self) -> Result<TokenValidation, ClientError> {
        self.client.send_json(ApiRequest::get("/api/auth/validate")).await
    }

    pub async fn select_role(&self, role: SelectableRole) -> Result<User, ClientError> {
        let req = ApiRequest::post("/api/auth/select-role").json(&RoleSelectionRequest { role })?;
        self.client.send_json(req).await
    }
}
