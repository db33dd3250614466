//! Content moderation collaborator.
//!
//! Session names, claimed captain names, and chat messages are submitted
//! here before acceptance. The engine only consumes the narrow [`Moderation`]
//! trait; the HTTP implementation posts to an external service, and the
//! no-op implementation (used when `MODERATION_URL` is unset) accepts
//! everything.

use async_trait::async_trait;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The moderation service's verdict for a batch of texts.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationVerdict {
    pub flagged: bool,
    /// User-facing reason, present when flagged.
    pub reason: Option<String>,
}

impl ModerationVerdict {
    pub fn clean() -> ModerationVerdict {
        ModerationVerdict {
            flagged: false,
            reason: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("Moderation service unavailable: {0}")]
    Unavailable(String),
}

/// Checks user-supplied text before it becomes visible to other
/// participants.
#[async_trait]
pub trait Moderation: Send + Sync {
    async fn check(&self, texts: &[&str]) -> Result<ModerationVerdict, ModerationError>;
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// Accepts everything. Used when no moderation endpoint is configured.
pub struct NoopModeration;

#[async_trait]
impl Moderation for NoopModeration {
    async fn check(&self, _texts: &[&str]) -> Result<ModerationVerdict, ModerationError> {
        Ok(ModerationVerdict::clean())
    }
}

/// Posts `{ "texts": [...] }` to an external moderation endpoint and
/// expects a [`ModerationVerdict`] JSON body back.
pub struct HttpModeration {
    client: reqwest::Client,
    url: String,
}

impl HttpModeration {
    pub fn new(url: String) -> HttpModeration {
        HttpModeration {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Moderation for HttpModeration {
    async fn check(&self, texts: &[&str]) -> Result<ModerationVerdict, ModerationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "texts": texts }))
            .send()
            .await
            .map_err(|e| ModerationError::Unavailable(e.to_string()))?;

        let verdict = response
            .error_for_status()
            .map_err(|e| ModerationError::Unavailable(e.to_string()))?
            .json::<ModerationVerdict>()
            .await
            .map_err(|e| ModerationError::Unavailable(e.to_string()))?;

        if verdict.flagged {
            tracing::info!(reason = ?verdict.reason, "Moderation flagged content");
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_accepts_everything() {
        let verdict = NoopModeration.check(&["anything at all"]).await.unwrap();
        assert!(!verdict.flagged);
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn verdict_deserializes_without_reason() {
        let verdict: ModerationVerdict = serde_json::from_str(r#"{"flagged": false}"#).unwrap();
        assert!(!verdict.flagged);
    }
}
