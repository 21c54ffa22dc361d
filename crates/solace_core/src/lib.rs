//! # Solace core
//!
//! Read-only building blocks shared by every session: text normalization,
//! the process-wide lexicon tables, emotion detection, tone styles and
//! configuration.

pub mod config;
pub mod emotion;
pub mod lexicon;
pub mod text;
pub mod tone;

pub use config::{GatewayConfig, SolaceConfig, Thresholds};
pub use emotion::{detect_emotion, Emotion, EmotionResult};
pub use lexicon::{lexicon, Lexicon};
pub use tone::ToneStyle;
