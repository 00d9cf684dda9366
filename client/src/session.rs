//! Login state and the current user.

use staymate_types::{LoginRequest, RegisterRequest, Role, SelectableRole, User};
use tokio::sync::broadcast;

use crate::{ApiClient, ClientError, SessionEvent};

#[derive(Debug, Clone)]
pub struct Session {
    client: ApiClient,
    user: Option<User>,
}

impl Session {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client, user: None }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User, ClientError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let auth = self.client.auth().login(&request).await?;
        self.client.store_auth(&auth)?;
        tracing::info!("Logged in");
        self.client.emit(SessionEvent::LoggedIn);
        self.load_user_or_clear().await
    }

    pub async fn register(&mut self, request: &RegisterRequest) -> Result<&User, ClientError> {
        let auth = self.client.auth().register(request).await?;
        self.client.store_auth(&auth)?;
        tracing::info!("Registered new account");
        self.client.emit(SessionEvent::LoggedIn);
        self.load_user_or_clear().await
    }

    /// Re-fetch the current user.
    ///
    /// Without stored credentials the user becomes `None` and no request is
    /// made. Any failure clears both the credentials and the user.
    pub async fn refresh_user(&mut self) -> Option<&User> {
        if !self.client.has_credentials() {
            self.user = None;
            return None;
        }
        if let Err(e) = self.load_user_or_clear().await {
            tracing::warn!("Failed to fetch current user: {e}");
            return None;
        }
        self.user.as_ref()
    }

    /// Best-effort server logout. Local credentials and the user are always
    /// cleared.
    pub async fn logout(&mut self) {
        if self.client.has_credentials()
            && let Err(e) = self.client.auth().logout().await
        {
            tracing::debug!("Server logout failed: {e}");
        }
        if let Err(e) = self.client.clear_tokens() {
            tracing::warn!("Failed to clear credentials: {e}");
        }
        self.user = None;
        tracing::info!("Logged out");
        self.client.emit(SessionEvent::LoggedOut);
    }

    /// Pick the role for an account created through OAuth.
    pub async fn select_role(&mut self, role: SelectableRole) -> Result<&User, ClientError> {
        let user = self.client.auth().select_role(role).await?;
        Ok(&*self.user.insert(user))
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    #[must_use]
    pub fn is_house_owner(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_house_owner)
    }

    #[must_use]
    pub fn is_regular_user(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_regular_user)
    }

    #[must_use]
    pub fn needs_role_selection(&self) -> bool {
        self.user.as_ref().is_some_and(User::needs_role_selection)
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.user.as_ref().is_some_and(|u| u.has_role(role))
    }

    /// Where a browser starts the Google sign-in flow.
    #[must_use]
    pub fn google_oauth_url(&self) -> String {
        format!("{}/oauth2/authorization/google", self.client.base_url())
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.client.subscribe()
    }

    async fn load_user_or_clear(&mut self) -> Result<&User, ClientError> {
        match self.client.auth().current_user().await {
            Ok(user) => Ok(&*self.user.insert(user)),
            Err(e) => {
                if let Err(clear) = self.client.clear_tokens() {
                    tracing::warn!("Failed to clear credentials: {clear}");
                }
                self.user = None;
                Err(e)
            }
        }
    }
}
