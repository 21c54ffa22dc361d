//! Conversation state machine.
//!
//! Transitions are a pure, total function of `(state, intent, emotion)`.
//! Distress and farewell intents are handled first, then a strong negative
//! emotion can pull the dialogue into SUPPORT from anywhere, and only after
//! that do topic-driven intents apply.

use serde::{Deserialize, Serialize};
use solace_core::lexicon::{lexicon, EXIT_COMMANDS};
use solace_core::text::{phrase_haystack, tokenize};
use solace_core::{EmotionResult, Thresholds};
use std::collections::VecDeque;
use std::fmt;

/// Transitions kept for status displays.
const HISTORY_LIMIT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    #[default]
    Greeting,
    SmallTalk,
    HomeworkHelp,
    Support,
    Escalation,
    Closing,
}

impl ConversationState {
    pub fn name(&self) -> &'static str {
        match self {
            ConversationState::Greeting => "GREETING",
            ConversationState::SmallTalk => "SMALL_TALK",
            ConversationState::HomeworkHelp => "HOMEWORK_HELP",
            ConversationState::Support => "SUPPORT",
            ConversationState::Escalation => "ESCALATION",
            ConversationState::Closing => "CLOSING",
        }
    }

    /// Sentence that opens a non-comfort reply in this state.
    pub fn lead_in(&self) -> &'static str {
        match self {
            ConversationState::Greeting => "Hi there, it's really nice to hear from you.",
            ConversationState::SmallTalk => "I'm enjoying chatting with you.",
            ConversationState::HomeworkHelp => {
                "Let's tackle this schoolwork together, one piece at a time."
            }
            ConversationState::Support => "I'm here and I'm listening.",
            ConversationState::Escalation => "I'm still right here with you.",
            ConversationState::Closing => {
                "Thank you for talking with me today. Take good care of yourself, and come back anytime."
            }
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the user is trying to do with an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Distress,
    Farewell,
    Greeting,
    HomeworkRequest,
    SeekingSupport,
    Gratitude,
    SmallTalk,
    Unknown,
}

impl Intent {
    /// Keyword-based intent recognition. Precedence follows declaration order.
    pub fn recognize(text: &str) -> Intent {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Intent::Unknown;
        }
        let hay = phrase_haystack(&tokens);
        let lex = lexicon();
        let vocab = &lex.intents;

        if lex.escalation.matches(&tokens, &hay) {
            Intent::Distress
        } else if is_exit_command(&tokens) || vocab.farewells.matches(&tokens, &hay) {
            Intent::Farewell
        } else if vocab.homework.matches(&tokens, &hay) {
            Intent::HomeworkRequest
        } else if vocab.greetings.matches(&tokens, &hay) {
            Intent::Greeting
        } else if vocab.support.matches(&tokens, &hay) {
            Intent::SeekingSupport
        } else if vocab.gratitude.matches(&tokens, &hay) {
            Intent::Gratitude
        } else {
            Intent::SmallTalk
        }
    }
}

/// `exit` or `quit` typed as the whole utterance.
fn is_exit_command(tokens: &[String]) -> bool {
    matches!(tokens, [only] if EXIT_COMMANDS.contains(&only.as_str()))
}

/// Compute the next state. Total over every input combination.
pub fn next_state(
    current: ConversationState,
    intent: Intent,
    emotion: &EmotionResult,
    thresholds: &Thresholds,
) -> ConversationState {
    use ConversationState as S;

    let negative = emotion.is_negative();

    match intent {
        Intent::Distress => return S::Escalation,
        Intent::Farewell => return S::Closing,
        _ => {}
    }

    if negative && emotion.intensity >= thresholds.support_override_intensity {
        return S::Support;
    }

    if intent == Intent::HomeworkRequest {
        return S::HomeworkHelp;
    }

    if intent == Intent::SeekingSupport
        || (negative && emotion.intensity >= thresholds.support_entry_intensity)
    {
        // Escalation is only left on calmer signals, never on more distress.
        return if current == S::Escalation {
            S::Escalation
        } else {
            S::Support
        };
    }

    match (intent, current) {
        (Intent::Greeting, S::Closing) => S::Greeting,
        (Intent::Greeting, S::Escalation) => S::Support,
        (Intent::Greeting, state) => state,
        (Intent::Gratitude | Intent::SmallTalk, S::Greeting) => S::SmallTalk,
        (Intent::Gratitude | Intent::SmallTalk, S::Support | S::Escalation) if !negative => {
            S::SmallTalk
        }
        (Intent::Gratitude | Intent::SmallTalk, S::Closing) => S::SmallTalk,
        (_, state) => state,
    }
}

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: ConversationState,
    pub intent: Intent,
    pub to: ConversationState,
}

/// Holds the current state of one session.
#[derive(Debug, Clone)]
pub struct StateMachine {
    current: ConversationState,
    thresholds: Thresholds,
    history: VecDeque<Transition>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl StateMachine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            current: ConversationState::Greeting,
            thresholds,
            history: VecDeque::new(),
        }
    }

    pub fn current(&self) -> ConversationState {
        self.current
    }

    /// Apply one turn and return the new state.
    pub fn advance(&mut self, intent: Intent, emotion: &EmotionResult) -> ConversationState {
        let from = self.current;
        let to = next_state(from, intent, emotion, &self.thresholds);
        if from != to {
            tracing::debug!("State {} --{:?}--> {}", from, intent, to);
        }
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(Transition { from, intent, to });
        self.current = to;
        to
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Transition> {
        self.history.iter()
    }

    /// Return to GREETING and forget history. Idempotent.
    pub fn reset(&mut self) {
        self.current = ConversationState::Greeting;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_core::Emotion;

    fn calm() -> EmotionResult {
        EmotionResult::neutral()
    }

    fn feeling(emotion: Emotion, intensity: f32) -> EmotionResult {
        EmotionResult::new(emotion, intensity)
    }

    const ALL_STATES: [ConversationState; 6] = [
        ConversationState::Greeting,
        ConversationState::SmallTalk,
        ConversationState::HomeworkHelp,
        ConversationState::Support,
        ConversationState::Escalation,
        ConversationState::Closing,
    ];

    #[test]
    fn test_recognize_intents() {
        assert_eq!(Intent::recognize(""), Intent::Unknown);
        assert_eq!(Intent::recognize("I feel hopeless"), Intent::Distress);
        assert_eq!(Intent::recognize("ok bye!"), Intent::Farewell);
        assert_eq!(Intent::recognize("exit"), Intent::Farewell);
        assert_eq!(Intent::recognize("good night"), Intent::Farewell);
        assert_eq!(Intent::recognize("Hello there"), Intent::Greeting);
        assert_eq!(Intent::recognize("can you help with my essay"), Intent::HomeworkRequest);
        assert_eq!(Intent::recognize("I just need to talk"), Intent::SeekingSupport);
        assert_eq!(Intent::recognize("thank you so much"), Intent::Gratitude);
        assert_eq!(Intent::recognize("I watched a movie"), Intent::SmallTalk);
    }

    #[test]
    fn test_quit_inside_a_sentence_is_not_farewell() {
        assert_eq!(Intent::recognize("quit"), Intent::Farewell);
        assert_eq!(Intent::recognize("Exit!"), Intent::Farewell);
        assert_eq!(
            Intent::recognize("I think I want to quit the swim team"),
            Intent::SmallTalk
        );
        assert_eq!(
            Intent::recognize("I have to go to a new school next month"),
            Intent::SmallTalk
        );
        assert_eq!(Intent::recognize("how do I exit vim"), Intent::SmallTalk);
        assert_eq!(Intent::recognize("ok I have to go now"), Intent::Farewell);
    }

    #[test]
    fn test_homework_beats_greeting() {
        assert_eq!(
            Intent::recognize("hey, can you help with my math homework"),
            Intent::HomeworkRequest
        );
        let t = Thresholds::default();
        let intent = Intent::recognize("hey, can you help with my math homework");
        assert_eq!(
            next_state(ConversationState::Greeting, intent, &calm(), &t),
            ConversationState::HomeworkHelp
        );
    }

    #[test]
    fn test_distress_beats_farewell() {
        assert_eq!(Intent::recognize("I'm giving up, bye"), Intent::Distress);
    }

    #[test]
    fn test_distress_always_escalates() {
        let t = Thresholds::default();
        for s in ALL_STATES {
            assert_eq!(
                next_state(s, Intent::Distress, &calm(), &t),
                ConversationState::Escalation
            );
        }
    }

    #[test]
    fn test_farewell_always_closes() {
        let t = Thresholds::default();
        for s in ALL_STATES {
            assert_eq!(
                next_state(s, Intent::Farewell, &feeling(Emotion::Sad, 0.95), &t),
                ConversationState::Closing
            );
        }
    }

    #[test]
    fn test_high_negative_intensity_overrides_topic() {
        let t = Thresholds::default();
        let e = feeling(Emotion::Anxious, 0.9);
        assert_eq!(
            next_state(ConversationState::HomeworkHelp, Intent::HomeworkRequest, &e, &t),
            ConversationState::Support
        );
        assert_eq!(
            next_state(ConversationState::Escalation, Intent::SmallTalk, &e, &t),
            ConversationState::Support
        );
    }

    #[test]
    fn test_high_positive_intensity_does_not_force_support() {
        let t = Thresholds::default();
        let e = feeling(Emotion::Happy, 0.95);
        assert_eq!(
            next_state(ConversationState::Greeting, Intent::SmallTalk, &e, &t),
            ConversationState::SmallTalk
        );
    }

    #[test]
    fn test_homework_request() {
        let t = Thresholds::default();
        assert_eq!(
            next_state(ConversationState::SmallTalk, Intent::HomeworkRequest, &calm(), &t),
            ConversationState::HomeworkHelp
        );
    }

    #[test]
    fn test_moderate_negative_enters_support_but_keeps_escalation() {
        let t = Thresholds::default();
        let e = feeling(Emotion::Sad, 0.5);
        assert_eq!(
            next_state(ConversationState::SmallTalk, Intent::SmallTalk, &e, &t),
            ConversationState::Support
        );
        assert_eq!(
            next_state(ConversationState::Escalation, Intent::SeekingSupport, &e, &t),
            ConversationState::Escalation
        );
    }

    #[test]
    fn test_calm_small_talk_leaves_support() {
        let t = Thresholds::default();
        assert_eq!(
            next_state(ConversationState::Support, Intent::Gratitude, &calm(), &t),
            ConversationState::SmallTalk
        );
        assert_eq!(
            next_state(ConversationState::Escalation, Intent::SmallTalk, &calm(), &t),
            ConversationState::SmallTalk
        );
        // Mild negativity keeps the support state
        assert_eq!(
            next_state(ConversationState::Support, Intent::SmallTalk, &feeling(Emotion::Sad, 0.2), &t),
            ConversationState::Support
        );
    }

    #[test]
    fn test_greeting_reopens_closed_conversation() {
        let t = Thresholds::default();
        assert_eq!(
            next_state(ConversationState::Closing, Intent::Greeting, &calm(), &t),
            ConversationState::Greeting
        );
        assert_eq!(
            next_state(ConversationState::HomeworkHelp, Intent::Greeting, &calm(), &t),
            ConversationState::HomeworkHelp
        );
    }

    #[test]
    fn test_unknown_stays() {
        let t = Thresholds::default();
        for s in ALL_STATES {
            assert_eq!(next_state(s, Intent::Unknown, &calm(), &t), s);
        }
    }

    #[test]
    fn test_machine_advance_and_reset() {
        let mut sm = StateMachine::default();
        assert_eq!(sm.current(), ConversationState::Greeting);
        sm.advance(Intent::SmallTalk, &calm());
        assert_eq!(sm.current(), ConversationState::SmallTalk);
        sm.advance(Intent::Farewell, &calm());
        assert_eq!(sm.current(), ConversationState::Closing);
        assert_eq!(sm.history().count(), 2);

        sm.reset();
        assert_eq!(sm.current(), ConversationState::Greeting);
        assert_eq!(sm.history().count(), 0);
        sm.reset();
        assert_eq!(sm.current(), ConversationState::Greeting);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut sm = StateMachine::default();
        for _ in 0..(HISTORY_LIMIT + 10) {
            sm.advance(Intent::SmallTalk, &calm());
        }
        assert_eq!(sm.history().count(), HISTORY_LIMIT);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(ConversationState::HomeworkHelp.to_string(), "HOMEWORK_HELP");
        let json = serde_json::to_string(&ConversationState::SmallTalk).unwrap();
        assert_eq!(json, "\"SMALL_TALK\"");
    }
}
