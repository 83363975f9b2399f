//! Encoding configuration: envelope key names and formatting callbacks.
//!
//! A config is built once, wrapped in an `Arc` by the top-level
//! [`Encoder`](crate::Encoder) and shared read-only by every clone derived
//! from it. Key names left empty omit the matching envelope entry.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use serde::Deserialize;

use crate::codec;
use crate::entry::EntryCaller;
use crate::error::ConfigError;
use crate::level::Level;
use crate::marshaler::ArrayEncoder;

/// Renders a level into the encoder.
pub type LevelEncoder = Arc<dyn Fn(Level, &mut dyn ArrayEncoder) + Send + Sync>;
/// Renders a timestamp into the encoder.
pub type TimeEncoder = Arc<dyn Fn(SystemTime, &mut dyn ArrayEncoder) + Send + Sync>;
/// Renders a logger name into the encoder.
pub type NameEncoder = Arc<dyn Fn(&str, &mut dyn ArrayEncoder) + Send + Sync>;
/// Renders a call site into the encoder.
pub type CallerEncoder = Arc<dyn Fn(&EntryCaller, &mut dyn ArrayEncoder) + Send + Sync>;

pub fn lowercase_level_encoder(level: Level, enc: &mut dyn ArrayEncoder) {
    enc.append_string(level.as_str());
}

pub fn capital_level_encoder(level: Level, enc: &mut dyn ArrayEncoder) {
    enc.append_string(level.capital_str());
}

/// Floating-point seconds since the Unix epoch.
pub fn epoch_time_encoder(time: SystemTime, enc: &mut dyn ArrayEncoder) {
    let (secs, nanos) = codec::unix_parts(time);
    enc.append_f64(secs as f64 + f64::from(nanos) / 1e9);
}

/// Floating-point milliseconds since the Unix epoch.
pub fn epoch_millis_time_encoder(time: SystemTime, enc: &mut dyn ArrayEncoder) {
    let (secs, nanos) = codec::unix_parts(time);
    enc.append_f64(secs as f64 * 1e3 + f64::from(nanos) / 1e6);
}

/// Integer nanoseconds since the Unix epoch.
pub fn epoch_nanos_time_encoder(time: SystemTime, enc: &mut dyn ArrayEncoder) {
    let (secs, nanos) = codec::unix_parts(time);
    enc.append_i64(secs.saturating_mul(1_000_000_000).saturating_add(i64::from(nanos)));
}

/// The codec's own timestamp representation.
pub fn native_time_encoder(time: SystemTime, enc: &mut dyn ArrayEncoder) {
    enc.append_time(time);
}

/// Writes the logger name unmodified.
pub fn full_name_encoder(name: &str, enc: &mut dyn ArrayEncoder) {
    enc.append_string(name);
}

/// `dir/file.rs:line`
pub fn short_caller_encoder(caller: &EntryCaller, enc: &mut dyn ArrayEncoder) {
    enc.append_string(&caller.trimmed_path());
}

/// `/full/path/to/file.rs:line`
pub fn full_caller_encoder(caller: &EntryCaller, enc: &mut dyn ArrayEncoder) {
    enc.append_string(&caller.full_path());
}

/// Envelope key names and formatting callbacks.
#[derive(Clone)]
pub struct EncoderConfig {
    pub message_key: String,
    pub level_key: String,
    pub time_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub stacktrace_key: String,

    pub level_encoder: LevelEncoder,
    /// Never consulted for the envelope time entry, which always uses the
    /// codec timestamp. Available to front-ends rendering times themselves.
    pub time_encoder: Option<TimeEncoder>,
    /// Falls back to [`full_name_encoder`] when unset.
    pub name_encoder: Option<NameEncoder>,
    pub caller_encoder: CallerEncoder,
}

impl EncoderConfig {
    /// Keys `ts`, `level`, `logger`, `caller`, `msg`, `stacktrace`.
    pub fn production() -> Self {
        Self {
            message_key: "msg".into(),
            level_key: "level".into(),
            time_key: "ts".into(),
            name_key: "logger".into(),
            caller_key: "caller".into(),
            stacktrace_key: "stacktrace".into(),
            level_encoder: Arc::new(lowercase_level_encoder),
            time_encoder: Some(Arc::new(epoch_time_encoder)),
            name_encoder: Some(Arc::new(full_name_encoder)),
            caller_encoder: Arc::new(short_caller_encoder),
        }
    }

    /// Keys `T`, `L`, `N`, `C`, `M`, `S` with capitalized levels.
    pub fn development() -> Self {
        Self {
            message_key: "M".into(),
            level_key: "L".into(),
            time_key: "T".into(),
            name_key: "N".into(),
            caller_key: "C".into(),
            stacktrace_key: "S".into(),
            level_encoder: Arc::new(capital_level_encoder),
            time_encoder: Some(Arc::new(native_time_encoder)),
            name_encoder: Some(Arc::new(full_name_encoder)),
            caller_encoder: Arc::new(short_caller_encoder),
        }
    }

    /// Production callbacks with every key empty: only the per-call fields are written.
    pub fn empty() -> Self {
        Self {
            message_key: String::new(),
            level_key: String::new(),
            time_key: String::new(),
            name_key: String::new(),
            caller_key: String::new(),
            stacktrace_key: String::new(),
            ..Self::production()
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl fmt::Debug for EncoderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderConfig")
            .field("message_key", &self.message_key)
            .field("level_key", &self.level_key)
            .field("time_key", &self.time_key)
            .field("name_key", &self.name_key)
            .field("caller_key", &self.caller_key)
            .field("stacktrace_key", &self.stacktrace_key)
            .field("time_encoder", &self.time_encoder.is_some())
            .field("name_encoder", &self.name_encoder.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelEncoderKind {
    Lowercase,
    Capital,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeEncoderKind {
    Epoch,
    Millis,
    Nanos,
    Native,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerEncoderKind {
    Short,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameEncoderKind {
    Full,
}

/// File form of [`EncoderConfig`], with formatters named by string.
///
/// ```toml
/// message_key = "message"
/// caller_key = ""
/// level_encoder = "capital"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub message_key: String,
    pub level_key: String,
    pub time_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub stacktrace_key: String,
    pub level_encoder: LevelEncoderKind,
    pub time_encoder: TimeEncoderKind,
    pub caller_encoder: CallerEncoderKind,
    pub name_encoder: NameEncoderKind,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            message_key: "msg".into(),
            level_key: "level".into(),
            time_key: "ts".into(),
            name_key: "logger".into(),
            caller_key: "caller".into(),
            stacktrace_key: "stacktrace".into(),
            level_encoder: LevelEncoderKind::Lowercase,
            time_encoder: TimeEncoderKind::Epoch,
            caller_encoder: CallerEncoderKind::Short,
            name_encoder: NameEncoderKind::Full,
        }
    }
}

impl EncoderSettings {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

impl From<EncoderSettings> for EncoderConfig {
    fn from(settings: EncoderSettings) -> Self {
        let level_encoder: LevelEncoder = match settings.level_encoder {
            LevelEncoderKind::Lowercase => Arc::new(lowercase_level_encoder),
            LevelEncoderKind::Capital => Arc::new(capital_level_encoder),
        };
        let time_encoder: TimeEncoder = match settings.time_encoder {
            TimeEncoderKind::Epoch => Arc::new(epoch_time_encoder),
            TimeEncoderKind::Millis => Arc::new(epoch_millis_time_encoder),
            TimeEncoderKind::Nanos => Arc::new(epoch_nanos_time_encoder),
            TimeEncoderKind::Native => Arc::new(native_time_encoder),
        };
        let caller_encoder: CallerEncoder = match settings.caller_encoder {
            CallerEncoderKind::Short => Arc::new(short_caller_encoder),
            CallerEncoderKind::Full => Arc::new(full_caller_encoder),
        };
        let name_encoder: NameEncoder = match settings.name_encoder {
            NameEncoderKind::Full => Arc::new(full_name_encoder),
        };

        Self {
            message_key: settings.message_key,
            level_key: settings.level_key,
            time_key: settings.time_key,
            name_key: settings.name_key,
            caller_key: settings.caller_key,
            stacktrace_key: settings.stacktrace_key,
            level_encoder,
            time_encoder: Some(time_encoder),
            name_encoder: Some(name_encoder),
            caller_encoder,
        }
    }
}
