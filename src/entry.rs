//! Log events and their assembly into forward-protocol `Entry` records.
//!
//! A record is a two-element sequence: the event time, then a map holding the
//! envelope entries (level, time, logger name, caller, message), any context
//! accumulated on the encoder, the per-call fields and finally the stack trace.

use std::fmt;
use std::panic::Location;
use std::time::SystemTime;

use crate::buffer::RecordBuffer;
use crate::codec;
use crate::config::full_name_encoder;
use crate::encoder::Encoder;
use crate::field::Field;
use crate::level::Level;
use crate::marshaler::ObjectEncoder;

/// Where a log call came from. `defined == false` means unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryCaller {
    pub defined: bool,
    pub file: String,
    pub line: u32,
}

impl EntryCaller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            defined: true,
            file: file.into(),
            line,
        }
    }

    /// The location of the code calling this function.
    #[track_caller]
    pub fn here() -> Self {
        Self::from(Location::caller())
    }

    pub fn undefined() -> Self {
        Self::default()
    }

    /// `file:line`, or `undefined`.
    pub fn full_path(&self) -> String {
        if !self.defined {
            return "undefined".to_string();
        }
        format!("{}:{}", self.file, self.line)
    }

    /// Last directory and file name with the line, e.g. `src/main.rs:42`.
    pub fn trimmed_path(&self) -> String {
        if !self.defined {
            return "undefined".to_string();
        }
        let file = self.file.as_str();
        let trimmed = file
            .rfind(['/', '\\'])
            .and_then(|last| file[..last].rfind(['/', '\\']))
            .map_or(file, |cut| &file[cut + 1..]);
        format!("{}:{}", trimmed, self.line)
    }
}

impl From<&Location<'_>> for EntryCaller {
    fn from(loc: &Location<'_>) -> Self {
        Self::new(loc.file(), loc.line())
    }
}

impl fmt::Display for EntryCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// A single log event. Only read while it is being encoded.
#[derive(Debug, Clone)]
pub struct Entry {
    pub level: Level,
    pub time: SystemTime,
    pub logger_name: String,
    pub message: String,
    pub caller: EntryCaller,
    pub stack: String,
}

impl Entry {
    /// An event at `level` stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            time: SystemTime::now(),
            logger_name: String::new(),
            message: message.into(),
            caller: EntryCaller::undefined(),
            stack: String::new(),
        }
    }

    pub fn with_time(mut self, time: SystemTime) -> Self {
        self.time = time;
        self
    }

    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn with_caller(mut self, caller: EntryCaller) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }
}

impl Encoder {
    /// Encodes `entry` and `fields` as `[time, {key: value, ...}]`.
    ///
    /// Entries and namespace accumulated on `self` are carried into the
    /// record after the message. An open namespace therefore prefixes the
    /// per-call field keys and the stacktrace key as well (`req.stacktrace`);
    /// the envelope keys before it are never prefixed.
    ///
    /// This always yields a record. A nested field that fails to encode is
    /// replaced with a `"<key>Error"` string entry (see [`Field::add_to`]).
    /// Both scratch encoders go back to the pool before returning.
    pub fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> RecordBuffer {
        let config = self.config();

        let mut finenc = self.scratch();
        codec::write_array_len(&mut finenc.buf, 2);
        codec::write_time(&mut finenc.buf, entry.time);

        let mut fin = self.scratch();

        if !config.level_key.is_empty() {
            fin.map_size += 1;
            codec::write_str(&mut fin.buf, &config.level_key);
            let mark = fin.buf.len();
            (config.level_encoder)(entry.level, &mut fin);
            if mark == fin.buf.len() {
                codec::write_str(&mut fin.buf, entry.level.as_str());
            }
        }
        if !config.time_key.is_empty() {
            fin.add_time(&config.time_key, entry.time);
        }
        if !entry.logger_name.is_empty() && !config.name_key.is_empty() {
            fin.map_size += 1;
            codec::write_str(&mut fin.buf, &config.name_key);
            let mark = fin.buf.len();
            match &config.name_encoder {
                Some(encode_name) => encode_name(&entry.logger_name, &mut fin),
                None => full_name_encoder(&entry.logger_name, &mut fin),
            }
            if mark == fin.buf.len() {
                codec::write_str(&mut fin.buf, &entry.logger_name);
            }
        }
        if entry.caller.defined && !config.caller_key.is_empty() {
            fin.map_size += 1;
            codec::write_str(&mut fin.buf, &config.caller_key);
            let mark = fin.buf.len();
            (config.caller_encoder)(&entry.caller, &mut fin);
            if mark == fin.buf.len() {
                codec::write_str(&mut fin.buf, &entry.caller.full_path());
            }
        }
        if !config.message_key.is_empty() {
            fin.map_size += 1;
            codec::write_str(&mut fin.buf, &config.message_key);
            codec::write_str(&mut fin.buf, &entry.message);
        }

        // Context accumulated on this encoder through Clone/with_fields.
        fin.buf.extend_from_slice(&self.buf);
        fin.map_size += self.map_size;
        fin.ns_prefix.push_str(&self.ns_prefix);

        for field in fields {
            field.add_to(&mut fin);
        }

        if !entry.stack.is_empty() && !config.stacktrace_key.is_empty() {
            fin.add_string(&config.stacktrace_key, &entry.stack);
        }

        finenc.frame_map(&fin);

        let mut out = RecordBuffer::get();
        out.write(&finenc.buf);
        out
    }
}
