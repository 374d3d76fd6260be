//! Transport that prints to the terminal.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use orchestrator::{MessageId, OrchestratorError, Selector, Target, Transport};
use tracing::debug;

/// Prints messages to stdout and numbers them so selections can refer back.
#[derive(Debug, Default)]
pub struct ConsoleTransport {
    next_id: AtomicUsize,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

fn describe(target: &Target) -> String {
    match target {
        Target::Channel(channel) => format!("#{}", channel),
        Target::Direct(user) => format!("@{}", user),
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send(
        &self,
        target: &Target,
        text: &str,
        attachment: Option<&Path>,
    ) -> Result<MessageId, OrchestratorError> {
        let id = format!("c{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        println!("[{}] {}\n{}", id, describe(target), text);
        if let Some(path) = attachment {
            println!("(attachment: {})", path.display());
        }
        println!();
        Ok(id)
    }

    async fn edit(&self, message_id: &str, text: &str) -> Result<(), OrchestratorError> {
        println!("[{}] (edited)\n{}\n", message_id, text);
        Ok(())
    }

    async fn register_selectors(
        &self,
        message_id: &str,
        selectors: &[Selector],
    ) -> Result<(), OrchestratorError> {
        let options: Vec<String> = selectors
            .iter()
            .map(|s| format!("{} {}", s.emoji(), s.token()))
            .collect();
        debug!(%message_id, count = selectors.len(), "Registered selectors");
        println!("[{}] /select {} <{}>\n", message_id, message_id, options.join(" | "));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let transport = ConsoleTransport::new();
        let target = Target::Channel("console".to_string());
        assert_eq!(transport.send(&target, "one", None).await.unwrap(), "c1");
        assert_eq!(transport.send(&target, "two", None).await.unwrap(), "c2");
    }
}
