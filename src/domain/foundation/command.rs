//! Command infrastructure for handlers.
//!
//! Instead of each handler accepting the actor, a correlation id and a
//! request source separately, they accept a single `CommandMetadata`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Actor, UserId};

/// Metadata context for command and query handlers.
///
/// Carries the request's [`Actor`] plus correlation context. The actor is
/// computed once per request by the caller; handlers never re-derive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub actor: Actor,

    /// Links related operations across a single user request.
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,

    /// Source of this command (e.g., "api", "admin", "test").
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            correlation_id: None,
            source: None,
        }
    }

    /// Builder: Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Builder: Add source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the correlation ID, generating one if not set.
    pub fn correlation_id(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The acting user, if authenticated.
    pub fn user_id(&self) -> Option<UserId> {
        self.actor.user_id
    }
}
