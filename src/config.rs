//! System configuration parameters
//!
//! All tunable timing parameters for the CarePal system, plus the
//! compile-time item and medication tables.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Main loop ---
    /// Main loop tick (milliseconds)
    pub tick_interval_ms: u32,
    /// Minimum gap between two accepted presses of the same button
    pub debounce_ms: u32,
    /// Reminder engine cadence (milliseconds)
    pub scheduler_interval_ms: u32,
    /// Quiet period before the menu is redrawn (milliseconds)
    pub idle_timeout_ms: u32,

    // --- Tag session ---
    /// Session ends after this long without a successful read
    pub tag_absence_timeout_ms: u32,
    /// Reader poll period inside the presence loop
    pub tag_poll_interval_ms: u32,

    // --- SOS ---
    /// Length of the alert window
    pub sos_window_ms: u32,
    /// How long the closing message stays up
    pub sos_closing_ms: u32,

    // --- Breathing exercise ---
    pub inhale_ms: u32,
    pub hold_ms: u32,
    pub exhale_ms: u32,
    /// Number of inhale/hold/exhale repetitions
    pub breathing_cycles: u8,

    // --- Prompts ---
    /// Hold time for short informational screens
    pub prompt_hold_ms: u32,
    /// Hold time for the hourly hydration nudge
    pub hydration_hold_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Main loop
            tick_interval_ms: 20,
            debounce_ms: 200,
            scheduler_interval_ms: 5_000,
            idle_timeout_ms: 15_000,

            // Tag session
            tag_absence_timeout_ms: 300,
            tag_poll_interval_ms: 25,

            // SOS
            sos_window_ms: 5_000,
            sos_closing_ms: 600,

            // Breathing
            inhale_ms: 4_000,
            hold_ms: 5_000,
            exhale_ms: 4_000,
            breathing_cycles: 2,

            // Prompts
            prompt_hold_ms: 1_500,
            hydration_hold_ms: 1_500,
        }
    }
}

impl SystemConfig {
    /// Range-check the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        if self.debounce_ms <= self.tick_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "debounce_ms must exceed tick_interval_ms",
            ));
        }
        if self.scheduler_interval_ms < self.tick_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "scheduler_interval_ms shorter than one tick",
            ));
        }
        if self.tag_poll_interval_ms == 0 || self.tag_poll_interval_ms >= self.tag_absence_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "tag_poll_interval_ms must be within the absence timeout",
            ));
        }
        if self.breathing_cycles == 0 {
            return Err(ConfigError::ValidationFailed("breathing_cycles must be > 0"));
        }
        // One full S-O-S burst has to fit in the window.
        if self.sos_window_ms < crate::drivers::beep_patterns::BeepPattern::SosBurst.duration_ms() {
            return Err(ConfigError::ValidationFailed("sos_window_ms shorter than one burst"));
        }
        Ok(())
    }

    /// Total run time of the breathing exercise, excluding the closing screen.
    pub fn exercise_duration_ms(&self) -> u32 {
        (self.inhale_ms + self.hold_ms + self.exhale_ms) * u32::from(self.breathing_cycles)
    }
}

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Compile-time tables
// ---------------------------------------------------------------------------

/// Known items: (token as hex, display name).
pub const KNOWN_ITEMS: &[(&str, &str)] = &[
    ("A3F1C22B", "Keys"),
    ("5B0E9D47", "Wallet"),
    ("C47A1E90", "Glasses"),
    ("04A2246A1F6280", "Pill Box"),
];

/// Medications: (name, hour, minute).
///
/// Must be in ascending time-of-day order; the "next medication" lookup
/// walks it linearly.
pub const MEDICATIONS: &[(&str, u8, u8)] = &[
    ("BP Tablet", 8, 0),
    ("Vitamin D", 13, 30),
    ("Sugar Pill", 20, 0),
];

/// Affirmations shown when a dose is acknowledged (max 16 chars each).
pub const AFFIRMATIONS: &[&str] = &[
    "Well done!",
    "Great job!",
    "You're doing it!",
    "Proud of you!",
    "Keep it up!",
];
