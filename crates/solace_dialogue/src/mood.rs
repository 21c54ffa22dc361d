//! Mood analysis and enhancement.
//!
//! `MoodEngine` maps a detected emotion to the need underneath it;
//! `MoodEnhancer` turns that need into a concrete, gentle suggestion.

use serde::{Deserialize, Serialize};
use solace_core::{detect_emotion, Emotion, EmotionResult, Thresholds};

/// Confidence reported when no need could be mapped.
const UNMAPPED_CONFIDENCE: f32 = 0.25;
const BASE_CONFIDENCE: f32 = 0.35;
const INTENSITY_CONFIDENCE: f32 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnderlyingNeed {
    Rest,
    Reassurance,
    Perspective,
    Confidence,
    Stimulation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub surface_emotion: Emotion,
    /// `None` for emotions with no direct mapping (HAPPY, NEUTRAL).
    pub underlying_need: Option<UnderlyingNeed>,
    /// In `[0.0, 1.0]`.
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnhancementType {
    EnergyBoost,
    PerspectiveLift,
    ConfidenceBuild,
    ComfortAnchor,
    CuriositySpark,
    /// Fallback when no need was identified.
    Grounding,
}

impl EnhancementType {
    pub fn for_need(need: Option<UnderlyingNeed>) -> Self {
        match need {
            Some(UnderlyingNeed::Rest) => EnhancementType::EnergyBoost,
            Some(UnderlyingNeed::Perspective) => EnhancementType::PerspectiveLift,
            Some(UnderlyingNeed::Confidence) => EnhancementType::ConfidenceBuild,
            Some(UnderlyingNeed::Reassurance) => EnhancementType::ComfortAnchor,
            Some(UnderlyingNeed::Stimulation) => EnhancementType::CuriositySpark,
            None => EnhancementType::Grounding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancementResult {
    pub enhancement_type: EnhancementType,
    pub enhancement_message: String,
    pub suggested_action: String,
}

// ============================================================================
// MoodEngine
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MoodEngine {
    thresholds: Thresholds,
}

impl MoodEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Detect the emotion in `text` and analyze it.
    pub fn analyze_mood(&self, text: &str) -> MoodAnalysis {
        self.analyze(&detect_emotion(text))
    }

    /// Analyze an already-detected emotion.
    pub fn analyze(&self, emotion: &EmotionResult) -> MoodAnalysis {
        let need = self.need_for(emotion.primary_emotion, emotion.intensity);
        let confidence = match need {
            Some(_) => (BASE_CONFIDENCE + INTENSITY_CONFIDENCE * emotion.intensity).clamp(0.0, 1.0),
            None => UNMAPPED_CONFIDENCE,
        };
        MoodAnalysis {
            surface_emotion: emotion.primary_emotion,
            underlying_need: need,
            confidence,
        }
    }

    fn need_for(&self, emotion: Emotion, intensity: f32) -> Option<UnderlyingNeed> {
        match emotion {
            Emotion::Sad if intensity >= self.thresholds.high_empathy_intensity => {
                Some(UnderlyingNeed::Reassurance)
            }
            Emotion::Sad | Emotion::Tired => Some(UnderlyingNeed::Rest),
            Emotion::Lonely => Some(UnderlyingNeed::Reassurance),
            Emotion::Stressed | Emotion::Overwhelmed | Emotion::Frustrated | Emotion::Angry => {
                Some(UnderlyingNeed::Perspective)
            }
            Emotion::Anxious => Some(UnderlyingNeed::Confidence),
            Emotion::Bored => Some(UnderlyingNeed::Stimulation),
            Emotion::Happy | Emotion::Neutral => None,
        }
    }
}

// ============================================================================
// MoodEnhancer
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct MoodEnhancer;

impl MoodEnhancer {
    pub fn new() -> Self {
        Self
    }

    pub fn enhance_mood(&self, analysis: &MoodAnalysis) -> EnhancementResult {
        let enhancement_type = EnhancementType::for_need(analysis.underlying_need);
        let (message, action) = template(enhancement_type, analysis.surface_emotion);
        EnhancementResult {
            enhancement_type,
            enhancement_message: message.to_string(),
            suggested_action: action.to_string(),
        }
    }
}

fn template(kind: EnhancementType, surface: Emotion) -> (&'static str, &'static str) {
    match kind {
        EnhancementType::EnergyBoost => (
            "It sounds like your energy is running low, and that's okay. Resting is part of getting through things.",
            "Try a glass of water, a slow stretch, or ten minutes away from screens.",
        ),
        EnhancementType::PerspectiveLift => (
            "When everything piles up it can feel bigger than it really is. Most of this is temporary, and it can be broken into smaller pieces.",
            "Write down the one thing that matters most today and set the rest aside for now.",
        ),
        EnhancementType::ConfidenceBuild => (
            "You're more capable than the worry is telling you. Think of one time you handled something hard; that strength is still yours.",
            "Pick one small step you can take in the next five minutes, and do just that.",
        ),
        EnhancementType::ComfortAnchor => (
            "You deserve kindness right now, especially from yourself. Feelings like this do pass, even when they feel heavy.",
            "Reach out to someone you trust, or wrap up in something cozy and let yourself rest.",
        ),
        EnhancementType::CuriositySpark => (
            "Sounds like you could use something new to spark your interest!",
            "Try learning one odd fact, doodling for five minutes, or playing a song you've never heard.",
        ),
        EnhancementType::Grounding if surface == Emotion::Happy => (
            "I love hearing that you're in good spirits! Let's savor this feeling for a moment.",
            "Jot down one thing that made today good so you can come back to it later.",
        ),
        EnhancementType::Grounding => (
            "Let's take a moment to check in with the present.",
            "Notice five things you can see, four you can hear, and three you can touch.",
        ),
    }
}
