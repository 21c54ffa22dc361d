//! One conversation: the per-turn pipeline and the state it owns.
//!
//! Per turn: detect emotion → recognize intent → state transition → topic
//! observation → reply (comfort or mood) → record the finished turn.
//! A session is single-threaded; hosts serialize turns per session.

use crate::comfort::ComfortEngine;
use crate::context::ConversationContext;
use crate::mood::{EnhancementResult, MoodEnhancer, MoodEngine};
use crate::state::{ConversationState, Intent, StateMachine};
use crate::topics::TopicClustering;
use serde::{Deserialize, Serialize};
use solace_core::{detect_emotion, EmotionResult, SolaceConfig, Thresholds, ToneStyle};

/// Everything a caller may display after one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub emotion: EmotionResult,
    pub intent: Intent,
    pub state: ConversationState,
    pub topic: String,
    pub active_topics: Vec<String>,
    pub turn_count: usize,
    /// True when the severe-distress override produced the reply.
    pub escalated: bool,
    /// Present when the mood path produced the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhancement: Option<EnhancementResult>,
}

/// Snapshot for status displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub state: ConversationState,
    pub tone: ToneStyle,
    pub turn_count: usize,
    pub duration_minutes: i64,
    pub current_mood: Option<String>,
    pub active_topics: Vec<String>,
}

pub struct DialogueSession {
    id: String,
    tone: ToneStyle,
    context: ConversationContext,
    state_machine: StateMachine,
    topics: TopicClustering,
    comfort: ComfortEngine,
    mood: MoodEngine,
    enhancer: MoodEnhancer,
    last_emotion: Option<EmotionResult>,
}

impl DialogueSession {
    pub fn new(id: impl Into<String>, tone: ToneStyle, thresholds: Thresholds) -> Self {
        Self {
            id: id.into(),
            tone,
            context: ConversationContext::new(),
            state_machine: StateMachine::new(thresholds.clone()),
            topics: TopicClustering::with_threshold(thresholds.topic_overlap),
            comfort: ComfortEngine::with_defaults(thresholds.clone()),
            mood: MoodEngine::new(thresholds),
            enhancer: MoodEnhancer::new(),
            last_emotion: None,
        }
    }

    pub fn from_config(id: impl Into<String>, config: &SolaceConfig) -> Self {
        Self::new(id, config.dialogue.default_tone, config.thresholds.clone())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tone(&self) -> ToneStyle {
        self.tone
    }

    pub fn set_tone(&mut self, tone: ToneStyle) {
        self.tone = tone;
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn state(&self) -> ConversationState {
        self.state_machine.current()
    }

    pub fn state_machine(&self) -> &StateMachine {
        &self.state_machine
    }

    pub fn topics(&self) -> &TopicClustering {
        &self.topics
    }

    /// Process one utterance and record the resulting turn.
    pub fn handle_turn(&mut self, text: &str) -> TurnOutcome {
        let emotion = detect_emotion(text);
        let intent = Intent::recognize(text);
        let state = self.state_machine.advance(intent, &emotion);
        let topic = self.topics.observe(text);

        let mut enhancement = None;
        let comfort =
            self.comfort
                .generate_comfort_for(text, Some(&emotion), Some(&self.context), self.tone);

        let (reply, escalated) = if comfort.escalated() || wants_comfort(state, &emotion) {
            (comfort.text(), comfort.escalated())
        } else {
            let analysis = self.mood.analyze(&emotion);
            let result = self.enhancer.enhance_mood(&analysis);
            let reply = mood_reply(state, &result);
            enhancement = Some(result);
            (reply, false)
        };

        self.context.add_turn(text, &reply, &topic);
        self.last_emotion = Some(emotion.clone());

        tracing::debug!(
            session = %self.id,
            state = %state,
            emotion = %emotion.primary_emotion,
            topic = %topic,
            "Turn {} handled",
            self.context.turn_count()
        );

        TurnOutcome {
            reply,
            emotion,
            intent,
            state,
            topic,
            active_topics: self.topics.active_topic_names(),
            turn_count: self.context.turn_count(),
            escalated,
            enhancement,
        }
    }

    /// Reset context, state machine and topics. Tone is kept. Idempotent.
    pub fn reset(&mut self) {
        self.context.reset();
        self.state_machine.reset();
        self.topics.reset_clusters();
        self.last_emotion = None;
        tracing::debug!(session = %self.id, "Session reset");
    }

    pub fn transcript(&self) -> String {
        self.context.to_transcript()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id.clone(),
            state: self.state(),
            tone: self.tone,
            turn_count: self.context.turn_count(),
            duration_minutes: self.context.conversation_duration_minutes(),
            current_mood: self.last_emotion.as_ref().map(|e| e.describe()),
            active_topics: self.topics.active_topic_names(),
        }
    }
}

fn wants_comfort(state: ConversationState, emotion: &EmotionResult) -> bool {
    matches!(
        state,
        ConversationState::Support | ConversationState::Escalation
    ) || emotion.is_negative()
}

fn mood_reply(state: ConversationState, enhancement: &EnhancementResult) -> String {
    if state == ConversationState::Closing {
        return state.lead_in().to_string();
    }
    format!(
        "{} {} {}",
        state.lead_in(),
        enhancement.enhancement_message,
        enhancement.suggested_action
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::EnhancementType;
    use solace_core::Emotion;

    fn session() -> DialogueSession {
        DialogueSession::new("test", ToneStyle::Empathetic, Thresholds::default())
    }

    #[test]
    fn test_greeting_turn_uses_mood_path() {
        let mut s = session();
        let out = s.handle_turn("hello!");
        assert_eq!(out.intent, Intent::Greeting);
        assert_eq!(out.state, ConversationState::Greeting);
        assert!(out.reply.starts_with(ConversationState::Greeting.lead_in()));
        assert_eq!(
            out.enhancement.as_ref().map(|e| e.enhancement_type),
            Some(EnhancementType::Grounding)
        );
        assert_eq!(out.turn_count, 1);
    }

    #[test]
    fn test_sad_turn_uses_comfort_path() {
        let mut s = session();
        let out = s.handle_turn("I'm feeling really sad and down");
        assert_eq!(out.emotion.primary_emotion, Emotion::Sad);
        assert_eq!(out.state, ConversationState::Support);
        assert!(out.reply.contains("sorry"));
        assert!(out.enhancement.is_none());
        assert!(!out.escalated);
    }

    #[test]
    fn test_distress_turn_escalates() {
        let mut s = session();
        let out = s.handle_turn("I feel hopeless");
        assert!(out.escalated);
        assert_eq!(out.state, ConversationState::Escalation);
        assert!(out.reply.contains("you matter"));
        // The escalated reply is what gets recorded
        assert_eq!(s.context().turns()[0].system_reply, out.reply);
    }

    #[test]
    fn test_bored_turn_gets_curiosity_spark() {
        let mut s = session();
        let out = s.handle_turn("so bored today");
        assert_eq!(out.emotion.primary_emotion, Emotion::Bored);
        assert_eq!(
            out.enhancement.map(|e| e.enhancement_type),
            Some(EnhancementType::CuriositySpark)
        );
    }

    #[test]
    fn test_farewell_closes() {
        let mut s = session();
        s.handle_turn("hi");
        let out = s.handle_turn("bye");
        assert_eq!(out.state, ConversationState::Closing);
        assert_eq!(out.reply, ConversationState::Closing.lead_in());
    }

    #[test]
    fn test_reset_restores_everything() {
        let mut s = session();
        s.handle_turn("my homework is due");
        s.handle_turn("I feel hopeless");
        s.reset();
        assert_eq!(s.context().turn_count(), 0);
        assert_eq!(s.state(), ConversationState::Greeting);
        assert!(s.topics().is_empty());
        assert!(s.status().current_mood.is_none());
        s.reset();
        assert_eq!(s.state(), ConversationState::Greeting);
        assert_eq!(s.tone(), ToneStyle::Empathetic);
    }

    #[test]
    fn test_status_reports_topics_and_mood() {
        let mut s = session();
        s.handle_turn("my exam is tomorrow and I'm worried");
        let status = s.status();
        assert_eq!(status.session_id, "test");
        assert_eq!(status.turn_count, 1);
        assert_eq!(status.active_topics, vec!["school"]);
        assert!(status.current_mood.unwrap().contains("anxious"));
    }

    #[test]
    fn test_set_tone_changes_comfort_register() {
        let mut s = session();
        s.set_tone(ToneStyle::Calming);
        let out = s.handle_turn("I'm so stressed");
        assert!(out.reply.contains(ToneStyle::Calming.opener()));
    }

    #[test]
    fn test_fifth_turn_is_reinforced() {
        let mut s = session();
        for turn in 1..=4 {
            let out = s.handle_turn("I'm feeling really sad and down");
            assert_eq!(out.turn_count, turn);
            assert!(!out.reply.contains("this has been on your mind"));
        }
        let out = s.handle_turn("I'm feeling really sad and down");
        assert_eq!(out.turn_count, 5);
        assert!(out.reply.contains("this has been on your mind"), "{}", out.reply);
    }

    #[test]
    fn test_quitting_an_activity_does_not_close() {
        let mut s = session();
        s.handle_turn("hi");
        let out = s.handle_turn("I think I want to quit the swim team");
        assert_ne!(out.intent, Intent::Farewell);
        assert_ne!(out.state, ConversationState::Closing);
        let out = s.handle_turn("I have to go to a new school next month");
        assert_ne!(out.state, ConversationState::Closing);
    }
}
