//! Loader for the form-pilot runtime configuration.
//!
//! Configuration comes from a YAML file (`pilot.yaml` by convention) merged
//! with `PILOT__`-prefixed environment variables; `${VAR}` placeholders are
//! expanded recursively before the merged tree is deserialised into typed
//! structs.
use config::{Config, ConfigError, Environment, File, FileFormat};
use pilot_common::{CandidateProfile, Target};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAX_ENV_EXPANSION_DEPTH: usize = 8;

/// Fully merged, typed runtime configuration.
#[derive(Debug, Deserialize)]
pub struct PilotConfig {
    /// The candidate driven through every target form.
    pub profile: CandidateProfile,
    /// Submission targets, attempted strictly in order.
    pub targets: Vec<Target>,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub pacing: PacingSettings,
    #[serde(default)]
    pub docgen: Option<DocgenSettings>,
}

#[derive(Debug, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}
fn default_headless() -> bool {
    true
}

/// Inclusive millisecond bounds for one delay class.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DelayBounds {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayBounds {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

/// Overrides for the human-timing simulator. Every field has a default so a
/// config file can override a single range without spelling out the rest.
#[derive(Debug, Clone, Deserialize)]
pub struct PacingSettings {
    #[serde(default = "default_letter")]
    pub letter_keystroke: DelayBounds,
    #[serde(default = "default_digit")]
    pub digit_keystroke: DelayBounds,
    #[serde(default = "default_symbol")]
    pub symbol_keystroke: DelayBounds,
    #[serde(default = "default_micro_pause")]
    pub micro_pause: DelayBounds,
    #[serde(default = "default_micro_pause_chance")]
    pub micro_pause_chance: f64,
    #[serde(default = "default_action")]
    pub action_gap: DelayBounds,
    #[serde(default = "default_hover")]
    pub hover_gap: DelayBounds,
    #[serde(default = "default_reading")]
    pub reading_pause: DelayBounds,
    #[serde(default = "default_settle")]
    pub settle: DelayBounds,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            letter_keystroke: default_letter(),
            digit_keystroke: default_digit(),
            symbol_keystroke: default_symbol(),
            micro_pause: default_micro_pause(),
            micro_pause_chance: default_micro_pause_chance(),
            action_gap: default_action(),
            hover_gap: default_hover(),
            reading_pause: default_reading(),
            settle: default_settle(),
        }
    }
}

fn default_letter() -> DelayBounds {
    DelayBounds::new(40, 120)
}
fn default_digit() -> DelayBounds {
    DelayBounds::new(80, 200)
}
fn default_symbol() -> DelayBounds {
    DelayBounds::new(120, 280)
}
fn default_micro_pause() -> DelayBounds {
    DelayBounds::new(600, 1800)
}
fn default_micro_pause_chance() -> f64 {
    0.04
}
fn default_action() -> DelayBounds {
    DelayBounds::new(150, 450)
}
fn default_hover() -> DelayBounds {
    DelayBounds::new(120, 350)
}
fn default_reading() -> DelayBounds {
    DelayBounds::new(900, 2600)
}
fn default_settle() -> DelayBounds {
    DelayBounds::new(600, 600)
}

/// Artifact generation settings for the cover-letter provider.
#[derive(Debug, Deserialize)]
pub struct DocgenSettings {
    /// Directory the per-target artifact files are written into.
    pub output_dir: PathBuf,
    /// Static attachment used when generation fails.
    #[serde(default)]
    pub fallback_attachment: Option<PathBuf>,
}

fn expand_string(s: &mut String) {
    let mut cur = std::mem::take(s);
    for _ in 0..MAX_ENV_EXPANSION_DEPTH {
        let expanded = match shellexpand::env(&cur) {
            Ok(cow) => cow.into_owned(),
            Err(_) => cur.clone(),
        };
        if expanded == cur {
            break;
        }
        cur = expanded;
    }
    *s = cur;
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) if s.contains('$') => expand_string(s),
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML file + env overrides).
pub struct PilotConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PilotConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PilotConfigLoader {
    /// Start with the defaults: `PILOT__`-prefixed env overrides on top of
    /// whatever files and snippets get attached.
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("PILOT").separator("__"));
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Merge an inline YAML snippet (used by tests and the CLI).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialise the merged sources.
    ///
    /// `${VAR}` placeholders anywhere in the tree are expanded (recursively,
    /// depth-capped so reference cycles terminate) before typing.
    pub fn load(self) -> Result<PilotConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: PilotConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(typed)
    }
}
