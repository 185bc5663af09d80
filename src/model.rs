//! Public response shapes and the pure mappings from raw Reddit JSON.
//!
//! Every mapping is deterministic and side-effect free. Missing fields fall
//! back to fixed defaults: `"Unknown"` for identifying strings, `0` for
//! numbers, `""` for bodies.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-text bodies are cut to this many characters for previews.
pub const PREVIEW_MAX_CHARS: usize = 200;

const PERMALINK_ORIGIN: &str = "https://reddit.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub account_created: String,
    pub link_karma: i64,
    pub comment_karma: i64,
    pub total_karma: i64,
    pub total_posts: u64,
    pub total_comments: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub subreddit: String,
    pub score: i64,
    pub ups: i64,
    pub downs: i64,
    pub num_comments: i64,
    pub created_utc: f64,
    pub created_time: String,
    pub permalink: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selftext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub subreddit: String,
    pub post_title: String,
    pub score: i64,
    pub created_utc: f64,
    pub created_time: String,
    pub body: String,
    pub comment_preview: String,
    pub permalink: String,
    pub url: String,
}

pub fn assemble_profile(identity: &Value, total_posts: u64, total_comments: u64) -> UserProfile {
    let link_karma = int_or_zero(identity, "link_karma");
    let comment_karma = int_or_zero(identity, "comment_karma");

    UserProfile {
        username: str_or(identity, "name", "Unknown"),
        account_created: format_date(float_or_zero(identity, "created_utc")),
        link_karma,
        comment_karma,
        total_karma: link_karma + comment_karma,
        total_posts,
        total_comments,
    }
}

pub fn assemble_post(raw: &Value) -> Post {
    let permalink = str_or(raw, "permalink", "");
    let created_utc = float_or_zero(raw, "created_utc");
    let selftext = raw
        .get("selftext")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Post {
        title: str_or(raw, "title", "Unknown"),
        subreddit: str_or(raw, "subreddit", "Unknown"),
        score: int_or_zero(raw, "score"),
        ups: int_or_zero(raw, "ups"),
        downs: int_or_zero(raw, "downs"),
        num_comments: int_or_zero(raw, "num_comments"),
        created_utc,
        created_time: format_timestamp(created_utc),
        url: absolute_url(&permalink),
        permalink,
        content_preview: selftext.as_deref().map(preview),
        selftext,
    }
}

pub fn assemble_comment(raw: &Value) -> Comment {
    let permalink = str_or(raw, "permalink", "");
    let created_utc = float_or_zero(raw, "created_utc");
    let body = str_or(raw, "body", "");

    Comment {
        subreddit: str_or(raw, "subreddit", "Unknown"),
        post_title: str_or(raw, "link_title", "Unknown"),
        score: int_or_zero(raw, "score"),
        created_utc,
        created_time: format_timestamp(created_utc),
        comment_preview: preview(&body),
        body,
        url: absolute_url(&permalink),
        permalink,
    }
}

/// The N chronologically earliest items of a full history, in non-decreasing
/// `created_utc` order.
pub fn oldest_slice(mut items: Vec<Value>, limit: usize) -> Vec<Value> {
    items.sort_by(|a, b| {
        float_or_zero(a, "created_utc").total_cmp(&float_or_zero(b, "created_utc"))
    });
    items.truncate(limit);
    items
}

/// First 200 characters, `"..."` appended only when something was cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_MAX_CHARS {
        let prefix: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
        format!("{prefix}...")
    } else {
        text.to_string()
    }
}

fn str_or(value: &Value, field: &str, default: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn int_or_zero(value: &Value, field: &str) -> i64 {
    value.get(field).and_then(Value::as_i64).unwrap_or(0)
}

fn float_or_zero(value: &Value, field: &str) -> f64 {
    value.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

fn absolute_url(permalink: &str) -> String {
    format!("{PERMALINK_ORIGIN}{permalink}")
}

fn format_timestamp(epoch: f64) -> String {
    DateTime::from_timestamp(epoch as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn format_date(epoch: f64) -> String {
    DateTime::from_timestamp(epoch as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}
