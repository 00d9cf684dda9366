//! Messaging view state.
//!
//! [`Inbox`] keeps the conversation list and the open conversation in step
//! with the backend. REST responses and real-time events both feed it; every
//! inbound event ends with a resync of the conversation list so unread counts
//! and previews converge on the server's view.

use staymate_types::{
    ConversationId, ConversationResponse, CreateConversationRequest, MessageResponse,
    NewMessageNotification, PageRequest, SendMessageRequest, UserId,
};

use crate::{ApiClient, ClientError};

/// Page fetched by [`Inbox::sync_conversations`].
pub const CONVERSATION_SYNC_PAGE: PageRequest = PageRequest::new(0, 50);
/// Messages loaded when a conversation is opened.
pub const OPEN_MESSAGE_PAGE: PageRequest = PageRequest::new(0, 100);

#[derive(Debug, Clone)]
pub struct Inbox {
    client: ApiClient,
    conversations: Vec<ConversationResponse>,
    total_unread: u32,
    search: Option<String>,
    selected: Option<ConversationResponse>,
    messages: Vec<MessageResponse>,
}

impl Inbox {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            conversations: Vec::new(),
            total_unread: 0,
            search: None,
            selected: None,
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn conversations(&self) -> &[ConversationResponse] {
        &self.conversations
    }

    #[must_use]
    pub fn total_unread(&self) -> u32 {
        self.total_unread
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ConversationResponse> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn messages(&self) -> &[MessageResponse] {
        &self.messages
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Change the search filter and refetch. A blank query clears it.
    pub async fn set_search(&mut self, query: Option<&str>) -> Result<(), ClientError> {
        self.search = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        self.sync_conversations().await
    }

    pub async fn sync_conversations(&mut self) -> Result<(), ClientError> {
        let list = self
            .client
            .messages()
            .conversations(CONVERSATION_SYNC_PAGE, self.search.as_deref())
            .await?;

        if let Some(selected) = &mut self.selected
            && let Some(fresh) = list.conversations.iter().find(|c| c.id == selected.id)
            && selected.header_changed(fresh)
        {
            *selected = fresh.clone();
        }

        self.conversations = list.conversations;
        self.total_unread = list.total_unread_count;
        tracing::debug!(
            conversations = self.conversations.len(),
            unread = self.total_unread,
            "Conversation list synced"
        );
        Ok(())
    }

    pub async fn open(&mut self, id: ConversationId) -> Result<(), ClientError> {
        let list = self.client.messages().messages(id, OPEN_MESSAGE_PAGE).await?;
        let conversation = match list.conversation {
            Some(conversation) => conversation,
            None => match self.conversations.iter().find(|c| c.id == id) {
                Some(known) => known.clone(),
                None => self.client.messages().conversation(id).await?,
            },
        };
        self.selected = Some(conversation);
        self.messages = list.messages;

        self.client.messages().mark_conversation_read(id).await?;
        self.sync_conversations().await
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.messages.clear();
    }

    /// Send to the open conversation. Blank content is ignored.
    pub async fn send(&mut self, content: &str) -> Result<Option<MessageResponse>, ClientError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        let Some(selected) = &self.selected else {
            return Err(ClientError::InvalidRequest("no conversation is open".into()));
        };

        let sent = self
            .client
            .messages()
            .send(&SendMessageRequest::text(selected.id, content))
            .await?;
        self.push_message(sent.clone());
        self.sync_conversations().await?;
        Ok(Some(sent))
    }

    /// A message pushed by the broker.
    pub async fn on_incoming(&mut self, message: MessageResponse) -> Result<(), ClientError> {
        if self.is_open(message.conversation_id) {
            let id = message.conversation_id;
            self.push_message(message);
            self.client.messages().mark_conversation_read(id).await?;
        }
        self.sync_conversations().await
    }

    /// A message alert without the message body.
    pub async fn on_new_message_alert(
        &mut self,
        alert: &NewMessageNotification,
    ) -> Result<(), ClientError> {
        if self.is_open(alert.conversation_id) {
            let list = self
                .client
                .messages()
                .messages(alert.conversation_id, OPEN_MESSAGE_PAGE)
                .await?;
            self.messages = list.messages;
            self.client
                .messages()
                .mark_conversation_read(alert.conversation_id)
                .await?;
        }
        self.sync_conversations().await
    }

    /// Create a conversation with `recipient` and open it.
    pub async fn start_conversation(
        &mut self,
        recipient: UserId,
        initial_message: Option<&str>,
    ) -> Result<&ConversationResponse, ClientError> {
        let request = CreateConversationRequest {
            recipient_id: recipient,
            subject: None,
            property_id: None,
            property_title: None,
            initial_message: initial_message
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        };
        let conversation = self.client.messages().create_conversation(&request).await?;
        let id = conversation.id;
        self.selected = Some(conversation);
        self.messages.clear();
        self.open(id).await?;
        self.selected
            .as_ref()
            .ok_or_else(|| ClientError::InvalidRequest("conversation closed while opening".into()))
    }

    fn is_open(&self, id: ConversationId) -> bool {
        self.selected.as_ref().is_some_and(|c| c.id == id)
    }

    fn push_message(&mut self, message: MessageResponse) {
        if self.messages.iter().any(|m| m.id == message.id) {
            return;
        }
        self.messages.push(message);
    }
}
