//! Measurement Protocol style event encoding.
//!
//! The output is a single `key=value&...` string with a fixed key order. Every
//! textual value is percent-encoded; numeric values are written verbatim.

use chrono::{DateTime, Utc};

use crate::{
    format::{encode_component, format_timestamp},
    types::{ClientContext, EventRecord, EventValue},
};

pub const PROTOCOL_VERSION: &str = "1";
pub const HIT_TYPE: &str = "event";

struct Pairs {
    out: String,
}

impl Pairs {
    fn new() -> Self {
        Self {
            out: String::with_capacity(256),
        }
    }

    fn raw(&mut self, key: &str, value: &str) -> &mut Self {
        if !self.out.is_empty() {
            self.out.push('&');
        }
        self.out.push_str(key);
        self.out.push('=');
        self.out.push_str(value);
        self
    }

    fn text(&mut self, key: &str, value: &str) -> &mut Self {
        self.raw(key, &encode_component(value))
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Encode one event into a transport body.
///
/// `stamp`, when present, is carried as `cd7`; a floating value then moves
/// from `cd7` to `cd8`. Identical inputs always produce identical output.
pub fn encode(
    record: &EventRecord,
    context: &ClientContext,
    property_id: &str,
    stamp: Option<DateTime<Utc>>,
) -> String {
    let client = context.options();
    let client_id = record.effective_client_id(context);

    let primary = match record.value {
        EventValue::Discrete(v) => v.to_string(),
        // ev is integer-only; the real value goes in a trailing dimension
        EventValue::Floating(_) => "1".to_string(),
    };

    let mut pairs = Pairs::new();
    pairs
        .raw("v", PROTOCOL_VERSION)
        .raw("t", HIT_TYPE)
        .text("tid", property_id)
        .text("cid", client_id)
        .text("ec", &record.category)
        .text("ea", &record.action)
        .text("el", &record.label)
        .raw("ev", &primary)
        .text("an", &client.app_name)
        .text("av", &client.app_version)
        .text("ul", &client.locale)
        .text("cd1", &client.os)
        .text("cd2", &client.os_version)
        .text("cd3", &client.device)
        .text("cd4", &client.arch)
        .text("cd5", &client.app_platform)
        // cid is rewritten by the collector, keep the original for joins
        .text("cd6", client_id);

    let mut next_dimension = 7;
    if let Some(ts) = stamp {
        pairs.text(&format!("cd{}", next_dimension), &format_timestamp(&ts));
        next_dimension += 1;
    }
    if let EventValue::Floating(v) = record.value {
        pairs.raw(&format!("cd{}", next_dimension), &v.to_string());
    }

    pairs.finish()
}
