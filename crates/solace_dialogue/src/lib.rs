//! # Solace dialogue
//!
//! The per-session half of the companion: conversation context, topic
//! clustering, the conversation state machine, mood analysis and the
//! comfort rule pipeline, tied together by [`DialogueSession`].

pub mod comfort;
pub mod context;
pub mod mood;
pub mod session;
pub mod state;
pub mod topics;

pub use comfort::{
    ComfortEngine, ComfortReply, ComfortRequest, ComfortRule, ComfortStrategy, EscalationRule,
    ReinforcementRule, RuleOutcome, StrategyRule,
};
pub use context::{ConversationContext, Turn};
pub use mood::{
    EnhancementResult, EnhancementType, MoodAnalysis, MoodEngine, MoodEnhancer, UnderlyingNeed,
};
pub use session::{DialogueSession, SessionStatus, TurnOutcome};
pub use state::{next_state, ConversationState, Intent, StateMachine, Transition};
pub use topics::{TopicCluster, TopicClustering, GENERAL_TOPIC};
