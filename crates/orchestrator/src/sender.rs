//! Transport trait and implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::error::OrchestratorError;
use crate::selector::Selector;

/// Id of a sent message, as assigned by the transport.
pub type MessageId = String;

/// Where a message goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A channel id.
    Channel(String),
    /// A user id, for direct messages.
    Direct(String),
}

/// Trait for delivering messages and selection prompts.
///
/// Abstracted to support different transports (chat services, console, tests).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a message, optionally with a file attached, returning its id.
    async fn send(
        &self,
        target: &Target,
        text: &str,
        attachment: Option<&Path>,
    ) -> Result<MessageId, OrchestratorError>;

    /// Replace the text of a sent message.
    async fn edit(&self, message_id: &str, text: &str) -> Result<(), OrchestratorError>;

    /// Offer selectors on a sent message, replacing any offered before.
    async fn register_selectors(
        &self,
        message_id: &str,
        selectors: &[Selector],
    ) -> Result<(), OrchestratorError>;
}

/// A transport that discards everything.
#[derive(Debug, Clone, Default)]
pub struct NoOpTransport;

#[async_trait]
impl Transport for NoOpTransport {
    async fn send(
        &self,
        _target: &Target,
        _text: &str,
        _attachment: Option<&Path>,
    ) -> Result<MessageId, OrchestratorError> {
        Ok(Uuid::new_v4().to_string())
    }

    async fn edit(&self, _message_id: &str, _text: &str) -> Result<(), OrchestratorError> {
        Ok(())
    }

    async fn register_selectors(
        &self,
        _message_id: &str,
        _selectors: &[Selector],
    ) -> Result<(), OrchestratorError> {
        Ok(())
    }
}

/// A transport that logs every operation.
#[derive(Debug, Clone, Default)]
pub struct LoggingTransport;

#[async_trait]
impl Transport for LoggingTransport {
    async fn send(
        &self,
        target: &Target,
        text: &str,
        attachment: Option<&Path>,
    ) -> Result<MessageId, OrchestratorError> {
        let id = Uuid::new_v4().to_string();
        info!(?target, %id, ?attachment, "Sending message: {}", text);
        Ok(id)
    }

    async fn edit(&self, message_id: &str, text: &str) -> Result<(), OrchestratorError> {
        info!(%message_id, "Editing message: {}", text);
        Ok(())
    }

    async fn register_selectors(
        &self,
        message_id: &str,
        selectors: &[Selector],
    ) -> Result<(), OrchestratorError> {
        let tokens: Vec<String> = selectors.iter().map(Selector::token).collect();
        info!(%message_id, selectors = ?tokens, "Registering selectors");
        Ok(())
    }
}

/// A message captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: MessageId,
    pub target: Target,
    pub text: String,
    pub attachment: Option<PathBuf>,
    pub selectors: Vec<Selector>,
}

/// A transport that records messages in memory, for tests.
///
/// Message ids are `m1`, `m2`, ... in send order.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    messages: Mutex<Vec<SentMessage>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message sent so far, with edits applied.
    pub async fn messages(&self) -> Vec<SentMessage> {
        self.messages.lock().await.clone()
    }

    pub async fn message(&self, message_id: &str) -> Option<SentMessage> {
        self.messages
            .lock()
            .await
            .iter()
            .find(|m| m.id == message_id)
            .cloned()
    }

    pub async fn last(&self) -> Option<SentMessage> {
        self.messages.lock().await.last().cloned()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        target: &Target,
        text: &str,
        attachment: Option<&Path>,
    ) -> Result<MessageId, OrchestratorError> {
        let mut messages = self.messages.lock().await;
        let id = format!("m{}", messages.len() + 1);
        messages.push(SentMessage {
            id: id.clone(),
            target: target.clone(),
            text: text.to_string(),
            attachment: attachment.map(Path::to_path_buf),
            selectors: Vec::new(),
        });
        Ok(id)
    }

    async fn edit(&self, message_id: &str, text: &str) -> Result<(), OrchestratorError> {
        let mut messages = self.messages.lock().await;
        let message = messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| OrchestratorError::SendFailed(format!("no message {}", message_id)))?;
        message.text = text.to_string();
        Ok(())
    }

    async fn register_selectors(
        &self,
        message_id: &str,
        selectors: &[Selector],
    ) -> Result<(), OrchestratorError> {
        let mut messages = self.messages.lock().await;
        let message = messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| OrchestratorError::SendFailed(format!("no message {}", message_id)))?;
        message.selectors = selectors.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_transport() {
        let transport = NoOpTransport;
        let id = transport
            .send(&Target::Channel("c1".to_string()), "hello", None)
            .await
            .unwrap();
        assert!(!id.is_empty());
        assert!(transport.edit(&id, "bye").await.is_ok());
    }

    #[tokio::test]
    async fn test_recording_transport() {
        let transport = RecordingTransport::new();
        let target = Target::Channel("c1".to_string());
        let id = transport.send(&target, "first", None).await.unwrap();
        assert_eq!(id, "m1");

        transport.edit(&id, "edited").await.unwrap();
        transport
            .register_selectors(&id, &[Selector::Choice(1), Selector::Cancel])
            .await
            .unwrap();

        let message = transport.message("m1").await.unwrap();
        assert_eq!(message.text, "edited");
        assert_eq!(message.selectors, vec![Selector::Choice(1), Selector::Cancel]);
        assert!(transport.edit("m9", "nope").await.is_err());
    }
}
