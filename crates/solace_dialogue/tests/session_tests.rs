//! End-to-end conversations through `DialogueSession`.

use solace_core::{Emotion, SolaceConfig, Thresholds, ToneStyle};
use solace_dialogue::{ConversationState, DialogueSession, Intent};

fn session() -> DialogueSession {
    DialogueSession::new("integration", ToneStyle::Balanced, Thresholds::default())
}

#[test]
fn test_scripted_conversation() {
    let mut s = session();

    let out = s.handle_turn("hey there");
    assert_eq!(out.state, ConversationState::Greeting);
    assert!(out.reply.starts_with(ConversationState::Greeting.lead_in()));

    let out = s.handle_turn("I have so much homework tonight");
    assert_eq!(out.intent, Intent::HomeworkRequest);
    assert_eq!(out.state, ConversationState::HomeworkHelp);
    assert_eq!(out.topic, "school");
    assert!(out.reply.starts_with(ConversationState::HomeworkHelp.lead_in()));

    let out = s.handle_turn("I'm really stressed about it");
    assert_eq!(out.emotion.primary_emotion, Emotion::Stressed);
    assert_eq!(out.state, ConversationState::Support);
    assert!(out.reply.starts_with(ToneStyle::Balanced.opener()));
    assert!(!out.escalated);

    let out = s.handle_turn("thanks, that helps");
    assert_eq!(out.intent, Intent::Gratitude);
    assert_eq!(out.state, ConversationState::SmallTalk);
    assert!(out.enhancement.is_some());

    let out = s.handle_turn("everything feels hopeless");
    assert!(out.escalated);
    assert_eq!(out.state, ConversationState::Escalation);
    assert!(out.reply.contains("you matter"));

    // Calm greeting steps down to support; past four turns, reinforcement appears
    let out = s.handle_turn("hello");
    assert_eq!(out.state, ConversationState::Support);
    assert!(!out.escalated);
    assert!(out.reply.contains("I can tell"));

    let out = s.handle_turn("bye");
    assert_eq!(out.state, ConversationState::Closing);
    assert_eq!(out.turn_count, 7);

    let transcript = s.transcript();
    assert!(transcript.contains("7 turn(s)"));
    assert!(transcript.contains("You: everything feels hopeless"));
    assert!(transcript.contains("(school)"));
}

#[test]
fn test_escalation_lookback_keeps_override_active() {
    let thresholds = Thresholds {
        escalation_lookback_turns: 2,
        ..Thresholds::default()
    };
    let mut s = DialogueSession::new("lookback", ToneStyle::Soft, thresholds);
    assert!(s.handle_turn("there's no point anymore").escalated);

    let out = s.handle_turn("ok");
    assert!(out.escalated);
    assert!(out.reply.contains("reach out"));
}

#[test]
fn test_without_lookback_override_ends_with_the_keyword() {
    let mut s = session();
    assert!(s.handle_turn("I want to give up").escalated);
    assert!(!s.handle_turn("ok").escalated);
}

#[test]
fn test_tone_switch_mid_session() {
    let mut s = session();
    s.handle_turn("I'm so stressed");
    s.set_tone(ToneStyle::Reassuring);
    let out = s.handle_turn("still so stressed");
    assert!(out.reply.starts_with(ToneStyle::Reassuring.opener()));
    assert_eq!(s.status().tone, ToneStyle::Reassuring);
}

#[test]
fn test_from_config_uses_default_tone() {
    let mut config = SolaceConfig::default();
    config.dialogue.default_tone = ToneStyle::Direct;
    let s = DialogueSession::from_config("cfg", &config);
    assert_eq!(s.tone(), ToneStyle::Direct);
    assert_eq!(s.id(), "cfg");
}

#[test]
fn test_reset_then_continue() {
    let mut s = session();
    s.handle_turn("my mom is annoying");
    s.handle_turn("bye");
    s.reset();
    let out = s.handle_turn("hi");
    assert_eq!(out.turn_count, 1);
    assert_eq!(out.state, ConversationState::Greeting);
    assert_eq!(s.status().active_topics.len(), 1);
}

#[test]
fn test_identical_sessions_reply_identically() {
    let script = ["hi", "I feel so alone", "school is boring", "thanks", "bye"];
    let mut a = session();
    let mut b = session();
    for line in script {
        assert_eq!(a.handle_turn(line).reply, b.handle_turn(line).reply);
    }
}
