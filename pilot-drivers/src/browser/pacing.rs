//! Human-timing simulator.
//!
//! Produces randomized delays and variable-speed keystroke pacing so driver
//! interactions read like a person at a keyboard rather than a script. All
//! ranges are configuration constants; nothing here can fail, only delay.
//! The simulator is a trait so tests can swap in [`InstantPacing`] and run
//! with zero delays.

use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// Inclusive millisecond bounds for one delay class.
#[derive(Debug, Clone, Copy)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

/// Keystroke class a character falls into. Letters and whitespace are typed
/// fastest, digits slower, punctuation and symbols slowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    Letter,
    Digit,
    Symbol,
}

pub fn classify_key(ch: char) -> KeyClass {
    if ch.is_alphabetic() || ch.is_whitespace() {
        KeyClass::Letter
    } else if ch.is_ascii_digit() {
        KeyClass::Digit
    } else {
        KeyClass::Symbol
    }
}

/// Delay ranges governing every class of simulated pause.
#[derive(Debug, Clone)]
pub struct PacingProfile {
    pub letter_keystroke: DelayRange,
    pub digit_keystroke: DelayRange,
    pub symbol_keystroke: DelayRange,
    /// Occasional longer hesitation injected mid-typing, an order of
    /// magnitude above per-character pacing.
    pub micro_pause: DelayRange,
    /// Probability of a micro-pause after any single character.
    pub micro_pause_chance: f64,
    /// Pre/post delay around each field-level action.
    pub action_gap: DelayRange,
    /// Gap between pointer-move-onto-target and the activation itself.
    pub hover_gap: DelayRange,
    /// Longer pause between structural transitions (step/section changes).
    pub reading_pause: DelayRange,
    /// Fixed wait for expand/collapse animations.
    pub settle: DelayRange,
}

impl Default for PacingProfile {
    fn default() -> Self {
        Self {
            letter_keystroke: DelayRange::new(40, 120),
            digit_keystroke: DelayRange::new(80, 200),
            symbol_keystroke: DelayRange::new(120, 280),
            micro_pause: DelayRange::new(600, 1800),
            micro_pause_chance: 0.04,
            action_gap: DelayRange::new(150, 450),
            hover_gap: DelayRange::new(120, 350),
            reading_pause: DelayRange::new(900, 2600),
            settle: DelayRange::new(600, 600),
        }
    }
}

/// Injectable timing strategy. Every UI action the engine performs is paced
/// through one of these methods.
#[async_trait]
pub trait Pacing: Send + Sync {
    /// Suspend for a random duration inside `range`.
    async fn pause(&self, range: DelayRange);

    /// Per-character delay after typing `ch`, plus the independent chance of
    /// a micro-pause.
    async fn keystroke_gap(&self, ch: char);

    /// Short delay between hovering a control and activating it.
    async fn hover_gap(&self);

    /// Reading pause between structural transitions.
    async fn reading_pause(&self);

    /// Fixed settle wait for animations.
    async fn settle(&self);

    /// Pre/post delay around a single field action.
    async fn action_gap(&self);
}

/// Production pacing: randomized delays drawn from a [`PacingProfile`].
#[derive(Debug, Clone)]
pub struct HumanPacing {
    profile: PacingProfile,
}

impl HumanPacing {
    pub fn new(profile: PacingProfile) -> Self {
        Self { profile }
    }

    fn draw(&self, range: DelayRange) -> Duration {
        let max = range.max_ms.max(range.min_ms);
        let ms = OsRng.gen_range(range.min_ms..=max);
        Duration::from_millis(ms)
    }
}

impl Default for HumanPacing {
    fn default() -> Self {
        Self::new(PacingProfile::default())
    }
}

#[async_trait]
impl Pacing for HumanPacing {
    async fn pause(&self, range: DelayRange) {
        sleep(self.draw(range)).await;
    }

    async fn keystroke_gap(&self, ch: char) {
        let range = match classify_key(ch) {
            KeyClass::Letter => self.profile.letter_keystroke,
            KeyClass::Digit => self.profile.digit_keystroke,
            KeyClass::Symbol => self.profile.symbol_keystroke,
        };
        sleep(self.draw(range)).await;

        let chance = self.profile.micro_pause_chance.clamp(0.0, 1.0);
        if OsRng.gen_bool(chance) {
            sleep(self.draw(self.profile.micro_pause)).await;
        }
    }

    async fn hover_gap(&self) {
        sleep(self.draw(self.profile.hover_gap)).await;
    }

    async fn reading_pause(&self) {
        sleep(self.draw(self.profile.reading_pause)).await;
    }

    async fn settle(&self) {
        sleep(self.draw(self.profile.settle)).await;
    }

    async fn action_gap(&self) {
        sleep(self.draw(self.profile.action_gap)).await;
    }
}

/// Zero-delay pacing for tests; every method returns immediately.
#[derive(Debug, Clone, Default)]
pub struct InstantPacing;

#[async_trait]
impl Pacing for InstantPacing {
    async fn pause(&self, _range: DelayRange) {}
    async fn keystroke_gap(&self, _ch: char) {}
    async fn hover_gap(&self) {}
    async fn reading_pause(&self) {}
    async fn settle(&self) {}
    async fn action_gap(&self) {}
}
