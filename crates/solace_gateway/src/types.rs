use serde::{Deserialize, Serialize};
use solace_core::ToneStyle;
use solace_dialogue::{ConversationState, TurnOutcome};

/// Inbound message for one conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Existing session to continue. A new session is opened when absent or
    /// unknown.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Message body text.
    pub body: String,
    /// Switch the session's tone before handling this turn.
    #[serde(default)]
    pub tone: Option<ToneStyle>,
}

/// Outbound reply for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub session_id: String,
    /// Reply text from Solace.
    pub content: String,
    /// Detected emotion, e.g. "fairly anxious".
    pub emotion: String,
    pub state: ConversationState,
    pub turn_count: usize,
    #[serde(default)]
    pub active_topics: Vec<String>,
    #[serde(default)]
    pub escalated: bool,
}

impl GatewayResponse {
    pub fn from_outcome(session_id: impl Into<String>, outcome: &TurnOutcome) -> Self {
        Self {
            session_id: session_id.into(),
            content: outcome.reply.clone(),
            emotion: outcome.emotion.describe(),
            state: outcome.state,
            turn_count: outcome.turn_count,
            active_topics: outcome.active_topics.clone(),
            escalated: outcome.escalated,
        }
    }
}
