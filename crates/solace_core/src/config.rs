use crate::tone::ToneStyle;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Threshold defaults
// ============================================================================

/// Intensity at or above which comfort strategies use their higher-empathy
/// variant.
pub const HIGH_EMPATHY_INTENSITY: f32 = 0.7;
/// Negative intensity at or above which the state machine moves to SUPPORT
/// from any state.
pub const SUPPORT_OVERRIDE_INTENSITY: f32 = 0.85;
/// Negative intensity at or above which ordinary turns drift into SUPPORT.
pub const SUPPORT_ENTRY_INTENSITY: f32 = 0.4;
/// Reinforcement is appended once the turn count exceeds this.
pub const REINFORCEMENT_MIN_TURNS: usize = 4;
/// Fraction of a turn's keywords that must overlap an existing topic cluster.
pub const TOPIC_OVERLAP: f32 = 0.5;
/// Earlier turns (beyond the latest input) scanned for escalation keywords.
pub const ESCALATION_LOOKBACK_TURNS: usize = 0;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SolaceConfig {
    pub dialogue: DialogueConfig,
    pub thresholds: Thresholds,
    pub gateway: GatewayConfig,
}

impl SolaceConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: SolaceConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.thresholds.sanitize();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return
    /// defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SOLACE_TONE") {
            match v.parse() {
                Ok(tone) => self.dialogue.default_tone = tone,
                Err(e) => tracing::warn!("Ignoring SOLACE_TONE: {}", e),
            }
        }
        if let Ok(v) = std::env::var("SOLACE_GATEWAY_HOST") {
            self.gateway.host = v;
        }
        if let Ok(v) = std::env::var("SOLACE_GATEWAY_PORT") {
            if let Ok(n) = v.parse() {
                self.gateway.port = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    pub default_tone: ToneStyle,
}

/// Every numeric cut-off used by the pipeline, in one place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub high_empathy_intensity: f32,
    pub support_override_intensity: f32,
    pub support_entry_intensity: f32,
    pub reinforcement_min_turns: usize,
    pub topic_overlap: f32,
    pub escalation_lookback_turns: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_empathy_intensity: HIGH_EMPATHY_INTENSITY,
            support_override_intensity: SUPPORT_OVERRIDE_INTENSITY,
            support_entry_intensity: SUPPORT_ENTRY_INTENSITY,
            reinforcement_min_turns: REINFORCEMENT_MIN_TURNS,
            topic_overlap: TOPIC_OVERLAP,
            escalation_lookback_turns: ESCALATION_LOOKBACK_TURNS,
        }
    }
}

impl Thresholds {
    /// Replace non-finite values with defaults and clamp the rest into `[0, 1]`.
    pub fn sanitize(&mut self) {
        let defaults = Self::default();
        let fix = |v: f32, fallback: f32| {
            if v.is_finite() {
                v.clamp(0.0, 1.0)
            } else {
                tracing::warn!("Non-finite threshold in config, using {}", fallback);
                fallback
            }
        };
        self.high_empathy_intensity =
            fix(self.high_empathy_intensity, defaults.high_empathy_intensity);
        self.support_override_intensity =
            fix(self.support_override_intensity, defaults.support_override_intensity);
        self.support_entry_intensity =
            fix(self.support_entry_intensity, defaults.support_entry_intensity);
        self.topic_overlap = fix(self.topic_overlap, defaults.topic_overlap);
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// New sessions are refused once this many are open.
    pub max_sessions: usize,
    /// Sessions untouched this long are closed by the sweeper, and may be
    /// evicted to make room when the registry is full.
    pub session_idle_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_sessions: 1024,
            session_idle_secs: 1800,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
