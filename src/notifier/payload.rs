//! Chat-webhook payload shape (§4.4), generalized from a Discord-style embed into a
//! provider-agnostic JSON body: a short top-level `content` line (the plain-text fallback for
//! mobile previews, equal to the alert message) plus one `embed` carrying the header, level/time
//! fields, project/check fields, the message body, optional metadata fields, and a footer
//! containing `check_id`.

use chrono::{TimeZone, Utc};
use serde::Serialize;

use crate::state_machine::{Alert, AlertLevel};

#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

const COLOR_CRITICAL: u32 = 15158332; // red
const COLOR_WARNING: u32 = 15105570; // orange
const COLOR_RECOVERY: u32 = 3066993; // green
const COLOR_INFO: u32 = 5793266; // light blue

pub fn color_for(level: AlertLevel) -> u32 {
    match level {
        AlertLevel::Critical => COLOR_CRITICAL,
        AlertLevel::Warning => COLOR_WARNING,
        AlertLevel::Recovery => COLOR_RECOVERY,
        AlertLevel::Info => COLOR_INFO,
    }
}

fn emoji_for(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Critical => "🔴",
        AlertLevel::Warning => "🟡",
        AlertLevel::Recovery => "✅",
        AlertLevel::Info => "ℹ️",
    }
}

fn level_label(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Critical => "critical",
        AlertLevel::Warning => "warning",
        AlertLevel::Recovery => "recovery",
        AlertLevel::Info => "info",
    }
}

/// The metadata keys `build_alert` (in `state_machine.rs`) always sets; the ones named explicitly
/// in §4.4 ("threshold, interval, grace, failure count") get their own fields, the rest of
/// `alert.metadata` is appended as extra fields so nothing the state machine attaches is dropped.
const KNOWN_METADATA_ORDER: [&str; 4] = ["threshold", "interval", "grace", "failure_count"];

#[derive(Default, Debug, Clone)]
pub struct PayloadBuilder {
    content: String,
    title: Option<String>,
    description: Option<String>,
    color: Option<u32>,
    fields: Vec<EmbedField>,
    footer: Option<String>,
}

impl PayloadBuilder {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    pub fn build(self) -> Payload {
        let embed = self.title.map(|title| Embed {
            title,
            description: self.description.unwrap_or_default(),
            color: self.color.unwrap_or(COLOR_INFO),
            fields: self.fields,
            footer: self.footer.map(|text| EmbedFooter { text }),
            timestamp: Utc::now().to_rfc3339(),
        });
        Payload {
            content: self.content,
            embed,
        }
    }
}

/// Build the full alert payload: header (emoji + title), level/time fields, project/check
/// fields, the message body, metadata fields, and a `check_id` footer (§4.4).
pub fn build_payload(alert: &Alert) -> Payload {
    let event_time = alert
        .metadata
        .get("event_time")
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default();

    let mut builder = PayloadBuilder::new(alert.message.clone())
        .title(format!("{} {}", emoji_for(alert.level), alert.title))
        .description(alert.message.clone())
        .color(color_for(alert.level))
        .field("level", level_label(alert.level), true)
        .field("time", event_time, true)
        .field("project", alert.project_name.clone(), true)
        .field("check", alert.check_name.clone(), true);

    for key in KNOWN_METADATA_ORDER {
        if let Some(value) = alert.metadata.get(key) {
            builder = builder.field(key, value.clone(), true);
        }
    }

    builder.footer(alert.check_id.clone()).build()
}
