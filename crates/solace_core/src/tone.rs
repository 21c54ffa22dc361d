use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendering register for comfort replies.
///
/// The strategy decides *what* is said; the tone decides how it opens and
/// closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneStyle {
    Soft,
    Empathetic,
    Calming,
    Uplifting,
    Reassuring,
    Encouraging,
    Direct,
    #[default]
    Balanced,
}

impl ToneStyle {
    pub const ALL: [ToneStyle; 8] = [
        ToneStyle::Soft,
        ToneStyle::Empathetic,
        ToneStyle::Calming,
        ToneStyle::Uplifting,
        ToneStyle::Reassuring,
        ToneStyle::Encouraging,
        ToneStyle::Direct,
        ToneStyle::Balanced,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ToneStyle::Soft => "soft",
            ToneStyle::Empathetic => "empathetic",
            ToneStyle::Calming => "calming",
            ToneStyle::Uplifting => "uplifting",
            ToneStyle::Reassuring => "reassuring",
            ToneStyle::Encouraging => "encouraging",
            ToneStyle::Direct => "direct",
            ToneStyle::Balanced => "balanced",
        }
    }

    /// Sentence placed before the strategy message. Empty for DIRECT.
    pub fn opener(&self) -> &'static str {
        match self {
            ToneStyle::Soft => "Hey, I'm here, gently and without any rush.",
            ToneStyle::Empathetic => "I hear you.",
            ToneStyle::Calming => "Let's slow things down together for a moment.",
            ToneStyle::Uplifting => "Thank you for sharing this with me.",
            ToneStyle::Reassuring => "You're not alone in this.",
            ToneStyle::Encouraging => "You've gotten through hard moments before.",
            ToneStyle::Direct => "",
            ToneStyle::Balanced => "Thanks for telling me.",
        }
    }

    /// Sentence placed after the strategy message.
    pub fn closer(&self) -> &'static str {
        match self {
            ToneStyle::Soft => "Take all the time you need.",
            ToneStyle::Empathetic => "I'm right here with you.",
            ToneStyle::Calming => "Try one slow breath with me, in and out.",
            ToneStyle::Uplifting => "Brighter moments are still ahead of you.",
            ToneStyle::Reassuring => "Whatever you're feeling is okay.",
            ToneStyle::Encouraging => "One small step is enough for now.",
            ToneStyle::Direct => "What's one thing we could change right now?",
            ToneStyle::Balanced => "We can figure out the next step together.",
        }
    }
}

impl fmt::Display for ToneStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ToneStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        ToneStyle::ALL
            .iter()
            .find(|t| t.label() == needle)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unknown tone style: '{}'", s))
    }
}
