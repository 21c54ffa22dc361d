//! Comfort engine: synthesizes supportive replies.
//!
//! A reply is built by an ordered list of [`ComfortRule`]s. The default
//! pipeline is:
//!
//! 1. [`EscalationRule`]: severe-distress keywords override everything else
//!    and finish the pipeline.
//! 2. [`StrategyRule`]: per-emotion [`ComfortStrategy`], rendered in the
//!    requested [`ToneStyle`].
//! 3. [`ReinforcementRule`]: a continuity clause for longer conversations.
//!
//! Nothing here mutates the context; callers record the turn themselves.

use crate::context::ConversationContext;
use solace_core::lexicon::lexicon;
use solace_core::text::{phrase_haystack, tokenize};
use solace_core::{Emotion, EmotionResult, Thresholds, ToneStyle};

const ESCALATION_MESSAGE: &str = "I'm really glad you told me, and I want you to know that you matter. \
What you're feeling right now is serious, and you deserve real support. \
Please reach out to someone you trust, or contact a local crisis line or emergency services right now. \
You don't have to go through this alone, and I'm staying right here with you.";

const PRESENCE_MESSAGE: &str =
    "I'm here with you. Whatever you're feeling, you don't have to put it into perfect words.";

const REINFORCEMENT_NEGATIVE: &str =
    "I can tell this has been on your mind for a while, and I'm glad you keep talking it through with me.";

const REINFORCEMENT_NEUTRAL: &str =
    "I can tell we've covered a lot together, and I'm glad you keep sharing with me.";

// ============================================================================
// Request / reply
// ============================================================================

/// Everything a rule may read. Missing inputs have already been replaced by
/// safe fallbacks, except `emotion`, which rules must treat as optional.
pub struct ComfortRequest<'a> {
    pub emotion: Option<&'a EmotionResult>,
    pub context: &'a ConversationContext,
    /// The utterance being answered when it isn't recorded in `context` yet.
    pub utterance: Option<&'a str>,
    pub tone: ToneStyle,
    pub thresholds: &'a Thresholds,
}

impl<'a> ComfortRequest<'a> {
    /// Inputs scanned for escalation keywords, newest first: the current
    /// utterance (or the latest recorded input) plus the configured lookback.
    pub fn recent_inputs(&self) -> Vec<&'a str> {
        let lookback = self.thresholds.escalation_lookback_turns;
        match self.utterance {
            Some(u) => std::iter::once(u)
                .chain(self.context.recent_user_inputs(lookback))
                .collect(),
            None => self.context.recent_user_inputs(lookback + 1).collect(),
        }
    }

    /// Turns in the conversation, counting the utterance being answered.
    pub fn turn_count(&self) -> usize {
        self.context.turn_count() + usize::from(self.utterance.is_some())
    }
}

/// Reply under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComfortReply {
    parts: Vec<String>,
    escalated: bool,
}

impl ComfortReply {
    pub fn push(&mut self, part: impl Into<String>) {
        let part = part.into();
        if !part.trim().is_empty() {
            self.parts.push(part);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn escalated(&self) -> bool {
        self.escalated
    }

    pub fn mark_escalated(&mut self) {
        self.escalated = true;
    }

    /// Final reply text. Never empty.
    pub fn text(&self) -> String {
        if self.parts.is_empty() {
            PRESENCE_MESSAGE.to_string()
        } else {
            self.parts.join(" ")
        }
    }
}

// ============================================================================
// ComfortRule trait
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Continue,
    Finish,
}

pub trait ComfortRule: Send + Sync {
    /// Inspect the request, optionally add to the reply, and say whether the
    /// pipeline should go on.
    fn apply(&self, request: &ComfortRequest<'_>, reply: &mut ComfortReply) -> RuleOutcome;

    /// Name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// ComfortEngine
// ============================================================================

pub struct ComfortEngine {
    rules: Vec<Box<dyn ComfortRule>>,
    thresholds: Thresholds,
}

impl Default for ComfortEngine {
    fn default() -> Self {
        Self::with_defaults(Thresholds::default())
    }
}

impl ComfortEngine {
    /// An engine with no rules. Replies fall back to a presence message.
    fn empty(thresholds: Thresholds) -> Self {
        Self {
            rules: Vec::new(),
            thresholds,
        }
    }

    /// Escalation, strategy and reinforcement, in that order.
    pub fn with_defaults(thresholds: Thresholds) -> Self {
        let mut engine = Self::empty(thresholds);
        engine.add_rule(Box::new(EscalationRule));
        engine.add_rule(Box::new(StrategyRule));
        engine.add_rule(Box::new(ReinforcementRule));
        engine
    }

    /// Append a rule after the built-in ones. Escalation always runs first.
    pub fn add_rule(&mut self, rule: Box<dyn ComfortRule>) {
        self.rules.push(rule);
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Produce a comfort reply. Never fails and never returns an empty string.
    ///
    /// A missing emotion yields a gentle presence message; a missing context
    /// is treated as a fresh one with zero turns.
    pub fn generate_comfort(
        &self,
        emotion: Option<&EmotionResult>,
        context: Option<&ConversationContext>,
        tone: ToneStyle,
    ) -> String {
        self.compose(None, emotion, context, tone).text()
    }

    /// Like [`generate_comfort`](Self::generate_comfort), but also scans an
    /// utterance that hasn't been added to the context yet, and reports
    /// whether the escalation override fired.
    pub fn generate_comfort_for(
        &self,
        utterance: &str,
        emotion: Option<&EmotionResult>,
        context: Option<&ConversationContext>,
        tone: ToneStyle,
    ) -> ComfortReply {
        self.compose(Some(utterance), emotion, context, tone)
    }

    fn compose(
        &self,
        utterance: Option<&str>,
        emotion: Option<&EmotionResult>,
        context: Option<&ConversationContext>,
        tone: ToneStyle,
    ) -> ComfortReply {
        let fresh;
        let context = match context {
            Some(c) => c,
            None => {
                tracing::debug!("Comfort requested without context, using a fresh one");
                fresh = ConversationContext::new();
                &fresh
            }
        };
        if emotion.is_none() {
            tracing::debug!("Comfort requested without an emotion result");
        }

        let request = ComfortRequest {
            emotion,
            context,
            utterance,
            tone,
            thresholds: &self.thresholds,
        };

        let mut reply = ComfortReply::default();
        for rule in &self.rules {
            if rule.apply(&request, &mut reply) == RuleOutcome::Finish {
                tracing::debug!("ComfortEngine: rule '{}' finished the reply", rule.name());
                break;
            }
        }
        reply
    }
}

// ============================================================================
// Built-in rules
// ============================================================================

/// Overrides every other rule when a severe-distress keyword is present.
pub struct EscalationRule;

impl EscalationRule {
    /// First escalation keyword found in any of `inputs`.
    pub fn detect<'i>(inputs: impl IntoIterator<Item = &'i str>) -> Option<&'static str> {
        let escalation = &lexicon().escalation;
        inputs.into_iter().find_map(|text| {
            let tokens = tokenize(text);
            let hay = phrase_haystack(&tokens);
            escalation.first_match(&tokens, &hay)
        })
    }
}

impl ComfortRule for EscalationRule {
    fn apply(&self, request: &ComfortRequest<'_>, reply: &mut ComfortReply) -> RuleOutcome {
        match Self::detect(request.recent_inputs()) {
            Some(keyword) => {
                tracing::info!("Escalation override triggered by keyword '{}'", keyword);
                reply.push(ESCALATION_MESSAGE);
                reply.mark_escalated();
                RuleOutcome::Finish
            }
            None => RuleOutcome::Continue,
        }
    }

    fn name(&self) -> &str {
        "escalation"
    }
}

/// Renders the per-emotion strategy, or a presence message without an emotion.
pub struct StrategyRule;

impl ComfortRule for StrategyRule {
    fn apply(&self, request: &ComfortRequest<'_>, reply: &mut ComfortReply) -> RuleOutcome {
        match request.emotion {
            Some(emotion) => {
                let strategy = ComfortStrategy::for_emotion(emotion.primary_emotion);
                let high = emotion.intensity >= request.thresholds.high_empathy_intensity;
                reply.push(strategy.render(high, request.tone));
            }
            None => reply.push(PRESENCE_MESSAGE),
        }
        RuleOutcome::Continue
    }

    fn name(&self) -> &str {
        "strategy"
    }
}

/// Appends a continuity clause once the conversation has some history.
pub struct ReinforcementRule;

impl ComfortRule for ReinforcementRule {
    fn apply(&self, request: &ComfortRequest<'_>, reply: &mut ComfortReply) -> RuleOutcome {
        if request.turn_count() > request.thresholds.reinforcement_min_turns {
            let negative = request.emotion.map_or(true, |e| e.is_negative());
            reply.push(if negative {
                REINFORCEMENT_NEGATIVE
            } else {
                REINFORCEMENT_NEUTRAL
            });
        }
        RuleOutcome::Continue
    }

    fn name(&self) -> &str {
        "reinforcement"
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// Response strategy per emotion. Emotions without a dedicated strategy use
/// `Default`, which still knows which emotion it is rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComfortStrategy {
    Sad,
    Anxious,
    Stressed,
    Frustrated,
    Overwhelmed,
    Default(Emotion),
}

impl ComfortStrategy {
    pub fn for_emotion(emotion: Emotion) -> Self {
        match emotion {
            Emotion::Sad => ComfortStrategy::Sad,
            Emotion::Anxious => ComfortStrategy::Anxious,
            Emotion::Stressed => ComfortStrategy::Stressed,
            Emotion::Frustrated => ComfortStrategy::Frustrated,
            Emotion::Overwhelmed => ComfortStrategy::Overwhelmed,
            other => ComfortStrategy::Default(other),
        }
    }

    /// Full strategy text: tone opener, core message, tone closer.
    pub fn render(&self, high_intensity: bool, tone: ToneStyle) -> String {
        [tone.opener(), self.core_message(high_intensity), tone.closer()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn core_message(&self, high_intensity: bool) -> &'static str {
        match (self, high_intensity) {
            (ComfortStrategy::Sad, true) => {
                "I'm so sorry you're carrying this much pain right now. Your feelings make complete sense, and you don't have to hold them by yourself."
            }
            (ComfortStrategy::Sad, false) => {
                "I'm sorry things feel heavy today. It's okay to have these feelings, and it's okay to go slowly."
            }
            (ComfortStrategy::Anxious, true) => {
                "That sounds really frightening, and your mind is working overtime to protect you. You're safe in this moment, and we can take it one breath at a time."
            }
            (ComfortStrategy::Anxious, false) => {
                "It's understandable to feel uneasy about this. Worry often makes things look bigger than they turn out to be."
            }
            (ComfortStrategy::Stressed, true) => {
                "That is a lot of pressure to be under, and it makes sense that you feel stretched thin. You don't have to solve everything at once."
            }
            (ComfortStrategy::Stressed, false) => {
                "It sounds like there's a lot on your plate. Let's see if we can make it feel a bit more manageable."
            }
            (ComfortStrategy::Frustrated, true) => {
                "It's completely understandable to feel this frustrated when things keep going wrong. Your reaction makes sense."
            }
            (ComfortStrategy::Frustrated, false) => {
                "That does sound annoying. It's okay to be fed up with it for a bit."
            }
            (ComfortStrategy::Overwhelmed, true) => {
                "When everything hits at once it can feel impossible to breathe. Let's set most of it down and look at just one small piece."
            }
            (ComfortStrategy::Overwhelmed, false) => {
                "It sounds like a lot is piling up. We can sort through it together, bit by bit."
            }
            (ComfortStrategy::Default(emotion), high) => default_message(*emotion, high),
        }
    }
}

fn default_message(emotion: Emotion, high: bool) -> &'static str {
    match emotion {
        Emotion::Angry if high => {
            "I can hear how angry you are, and that's a valid feeling. I'm here to listen without judgment."
        }
        Emotion::Angry => {
            "It makes sense to feel angry when something feels unfair. I'm here to listen."
        }
        Emotion::Lonely if high => {
            "Feeling this alone is really hard. I'm glad you reached out, and I'm here with you now."
        }
        Emotion::Lonely => "Feeling left out is hard. I'm glad you're talking with me.",
        Emotion::Tired => "It sounds like you're running on empty. You deserve some rest.",
        Emotion::Bored => {
            "Sounds like the day is dragging a bit. Maybe we can find something to make it more interesting."
        }
        Emotion::Happy => "I'm really glad to hear that! It's lovely to share good moments with you.",
        _ => "I'm here with you. Tell me more about what's on your mind.",
    }
}
