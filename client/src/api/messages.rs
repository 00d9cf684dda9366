use staymate_types::{
    ConversationId, ConversationListResponse, ConversationResponse, CreateConversationRequest,
    MarkAsReadRequest, MessageId, MessageListResponse, MessageResponse, PageRequest,
    SendMessageRequest, UnreadCountResponse,
};

use crate::{ApiClient, ApiRequest, ClientError};

/// Default page for [`MessagesApi::messages`].
pub const DEFAULT_MESSAGE_PAGE: PageRequest = PageRequest::new(0, 50);

#[derive(Debug, Clone, Copy)]
pub struct MessagesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> MessagesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of conversations, optionally filtered by a search term.
    /// A blank search is not sent.
    pub async fn conversations(
        &self,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<ConversationListResponse, ClientError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let req = ApiRequest::get("/api/messages/conversations")
            .query_pairs(page.to_query())
            .query_opt("search", search);
        self.client.send_json(req).await
    }

    pub async fn all_conversations(&self) -> Result<Vec<ConversationResponse>, ClientError> {
        self.client
            .send_json(ApiRequest::get("/api/messages/conversations/all"))
            .await
    }

    pub async fn conversation(
        &self,
        id: ConversationId,
    ) -> Result<ConversationResponse, ClientError> {
        self.client
            .send_json(ApiRequest::get(format!("/api/messages/conversations/{id}")))
            .await
    }

    pub async fn messages(
        &self,
        id: ConversationId,
        page: PageRequest,
    ) -> Result<MessageListResponse, ClientError> {
        let req = ApiRequest::get(format!("/api/messages/conversations/{id}/messages"))
            .query_pairs(page.to_query());
        self.client.send_json(req).await
    }

    pub async fn create_conversation(
        &self,
        request: &CreateConversationRequest,
    ) -> Result<ConversationResponse, ClientError> {
        let req = ApiRequest::post("/api/messages/conversations").json(request)?;
        self.client.send_json(req).await
    }

    pub async fn send(&self, request: &SendMessageRequest) -> Result<MessageResponse, ClientError> {
        if request.conversation_id.is_none() && request.recipient_id.is_none() {
            return Err(ClientError::InvalidRequest(
                "a message needs a conversation or a recipient".into(),
            ));
        }
        let req = ApiRequest::post("/api/messages/send").json(request)?;
        self.client.send_json(req).await
    }

    pub async fn mark_read(&self, request: &MarkAsReadRequest) -> Result<(), ClientError> {
        let req = ApiRequest::post("/api/messages/mark-read").json(request)?;
        self.client.send_empty(req).await
    }

    pub async fn mark_conversation_read(&self, id: ConversationId) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::post(format!(
                "/api/messages/conversations/{id}/read"
            )))
            .await
    }

    pub async fn delete_conversation(&self, id: ConversationId) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::delete(format!("/api/messages/conversations/{id}")))
            .await
    }

    pub async fn delete_message(&self, id: MessageId) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::delete(format!("/api/messages/messages/{id}")))
            .await
    }

    pub async fn unread_count(&self) -> Result<UnreadCountResponse, ClientError> {
        self.client
            .send_json(ApiRequest::get("/api/messages/unread-count"))
            .await
    }
}
