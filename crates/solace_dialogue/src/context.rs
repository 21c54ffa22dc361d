//! Per-session conversation memory.
//!
//! Turns are append-only and kept in insertion order. Every accessor works on
//! an empty context and returns a neutral default instead of failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user message and the reply it received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub user_text: String,
    pub system_reply: String,
    pub topic_tag: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    turns: Vec<Turn>,
    session_start: DateTime<Utc>,
    current_topic: String,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Create a context whose session clock started at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            turns: Vec::new(),
            session_start: start,
            current_topic: String::new(),
        }
    }

    /// Append a finished turn and make its topic current.
    pub fn add_turn(&mut self, user_text: &str, system_reply: &str, topic_tag: &str) {
        self.push_turn(Turn {
            user_text: user_text.to_string(),
            system_reply: system_reply.to_string(),
            topic_tag: topic_tag.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Append a pre-built turn. Timestamps are taken as given.
    pub fn push_turn(&mut self, turn: Turn) {
        if !turn.topic_tag.is_empty() {
            self.current_topic = turn.topic_tag.clone();
        }
        self.turns.push(turn);
    }

    /// Clear turns and topic state and restart the session clock.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.current_topic.clear();
        self.session_start = Utc::now();
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// User text of the latest turn, or `""` when there are no turns.
    pub fn last_user_input(&self) -> &str {
        self.turns.last().map(|t| t.user_text.as_str()).unwrap_or("")
    }

    /// Up to `n` most recent user inputs, newest first.
    pub fn recent_user_inputs(&self, n: usize) -> impl Iterator<Item = &str> {
        self.turns.iter().rev().take(n).map(|t| t.user_text.as_str())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn current_topic(&self) -> &str {
        &self.current_topic
    }

    pub fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    /// Whole minutes elapsed since the session started.
    pub fn conversation_duration_minutes(&self) -> i64 {
        self.duration_minutes_at(Utc::now())
    }

    /// Whole minutes between session start and `now`, never negative.
    pub fn duration_minutes_at(&self, now: DateTime<Utc>) -> i64 {
        (now - self.session_start).num_minutes().max(0)
    }

    /// Render the session as a plain-text transcript.
    pub fn to_transcript(&self) -> String {
        let mut out = format!(
            "Conversation started {}\nDuration: {} min, {} turn(s)\n",
            self.session_start.format("%Y-%m-%d %H:%M:%S UTC"),
            self.conversation_duration_minutes(),
            self.turns.len()
        );
        for turn in &self.turns {
            out.push('\n');
            let topic = if turn.topic_tag.is_empty() {
                "general"
            } else {
                turn.topic_tag.as_str()
            };
            out.push_str(&format!(
                "[{}] ({})\nYou: {}\nSolace: {}\n",
                turn.timestamp.format("%H:%M:%S"),
                topic,
                turn.user_text,
                turn.system_reply
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_empty_context_defaults() {
        let ctx = ConversationContext::new();
        assert_eq!(ctx.turn_count(), 0);
        assert_eq!(ctx.last_user_input(), "");
        assert_eq!(ctx.current_topic(), "");
        assert_eq!(ctx.conversation_duration_minutes(), 0);
        assert_eq!(ctx.recent_user_inputs(3).count(), 0);
    }

    #[test]
    fn test_add_turn_preserves_order() {
        let mut ctx = ConversationContext::new();
        ctx.add_turn("first", "r1", "school");
        ctx.add_turn("second", "r2", "family");
        ctx.add_turn("third", "r3", "family");

        assert_eq!(ctx.turn_count(), 3);
        assert_eq!(ctx.last_user_input(), "third");
        assert_eq!(ctx.current_topic(), "family");
        let texts: Vec<&str> = ctx.turns().iter().map(|t| t.user_text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        let recent: Vec<&str> = ctx.recent_user_inputs(2).collect();
        assert_eq!(recent, vec!["third", "second"]);
    }

    #[test]
    fn test_empty_topic_tag_keeps_current_topic() {
        let mut ctx = ConversationContext::new();
        ctx.add_turn("exams", "r", "school");
        ctx.add_turn("hmm", "r", "");
        assert_eq!(ctx.current_topic(), "school");
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut ctx = ConversationContext::new();
        ctx.add_turn("hello", "hi", "general");
        ctx.reset();
        assert_eq!(ctx.turn_count(), 0);
        assert_eq!(ctx.last_user_input(), "");
        assert_eq!(ctx.current_topic(), "");
        ctx.reset();
        assert_eq!(ctx.turn_count(), 0);
    }

    #[test]
    fn test_duration_minutes() {
        let start = Utc::now() - Duration::minutes(12);
        let ctx = ConversationContext::starting_at(start);
        assert_eq!(ctx.duration_minutes_at(start + Duration::minutes(12)), 12);
        assert_eq!(ctx.duration_minutes_at(start + Duration::seconds(59)), 0);
        // Clock skew never yields negative durations
        assert_eq!(ctx.duration_minutes_at(start - Duration::minutes(5)), 0);
    }

    #[test]
    fn test_transcript_lists_turns() {
        let mut ctx = ConversationContext::new();
        ctx.add_turn("I failed my test", "I'm sorry to hear that.", "school");
        ctx.add_turn("ok", "Okay.", "");
        let transcript = ctx.to_transcript();
        assert!(transcript.contains("2 turn(s)"));
        assert!(transcript.contains("(school)\nYou: I failed my test\nSolace: I'm sorry to hear that."));
        assert!(transcript.contains("(general)\nYou: ok"));
    }
}
