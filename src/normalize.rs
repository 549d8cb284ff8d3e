use std::str::FromStr;

use rand::Rng;
use serde_json::{Map, Value};

use crate::models::PlayerRecord;

/// How fields missing from an upstream payload are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultPolicy {
    /// Fixed neutral values ("Unknown", 0, "Unranked"). Deterministic.
    #[default]
    Neutral,
    /// Random but plausible level/kill/match counts and a current `last_seen`.
    Synthesized,
}

impl FromStr for DefaultPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "neutral" | "strict" => Ok(DefaultPolicy::Neutral),
            "synthesized" | "synthetic" => Ok(DefaultPolicy::Synthesized),
            other => Err(format!(
                "unknown policy `{other}`, expected `neutral` or `synthesized`"
            )),
        }
    }
}

impl DefaultPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultPolicy::Neutral => "neutral",
            DefaultPolicy::Synthesized => "synthesized",
        }
    }
}

const NICKNAME: &[&str] = &["nickname", "username", "name"];
const LEVEL: &[&str] = &["level", "lvl"];
const RANK: &[&str] = &["rank", "tier"];
const REGION: &[&str] = &["region", "server"];
const CLAN: &[&str] = &["clan", "guild"];
const KILLS: &[&str] = &["kills", "total_kills"];
const MATCHES: &[&str] = &["matches", "total_matches"];
const IMG_URL: &[&str] = &["img_url", "avatar", "profile_pic"];
const LAST_SEEN: &[&str] = &["last_seen", "last_login"];

/// Where the player record sits inside an upstream payload.
#[derive(Debug, PartialEq)]
enum Shape<'a> {
    Wrapped(&'a Value),
    Bare(&'a Value),
    FirstOfList(&'a Value),
    Unrecognized,
}

impl<'a> Shape<'a> {
    /// Rules are tried in priority order; the first match wins.
    fn detect(body: &'a Value) -> Self {
        for key in ["player", "data", "result"] {
            if let Some(inner) = body.get(key).filter(|v| !v.is_null()) {
                return Shape::Wrapped(inner);
            }
        }

        if NICKNAME.iter().any(|key| body.get(key).is_some_and(|v| !v.is_null())) {
            return Shape::Bare(body);
        }

        match body.as_array().and_then(|items| items.first()) {
            Some(first) => Shape::FirstOfList(first),
            None => Shape::Unrecognized,
        }
    }

    fn node(&self) -> Option<&'a Value> {
        match *self {
            Shape::Wrapped(v) | Shape::Bare(v) | Shape::FirstOfList(v) => Some(v),
            Shape::Unrecognized => None,
        }
    }
}

/// Extracts a canonical record from an arbitrary upstream payload.
///
/// Returns `None` when the payload shape is not recognized or the located
/// record is not a JSON object. Never panics on malformed input.
pub fn normalize(body: &Value, uid: &str, policy: DefaultPolicy) -> Option<PlayerRecord> {
    let shape = Shape::detect(body);
    let player = shape.node()?.as_object()?;

    let text = |aliases: &[&str]| first_of(player, aliases, as_text);
    let number = |aliases: &[&str]| first_of(player, aliases, as_number);
    let level = |aliases: &[&str]| first_of(player, aliases, as_level);

    let fill = Fill::new(policy);

    Some(PlayerRecord {
        uid: uid.to_string(),
        nickname: text(NICKNAME).unwrap_or_else(|| "Unknown".to_string()),
        level: level(LEVEL).unwrap_or_else(|| fill.level()),
        rank: text(RANK).unwrap_or_else(|| "Unranked".to_string()),
        region: text(REGION).unwrap_or_else(|| "Unknown".to_string()),
        clan: text(CLAN).unwrap_or_else(|| "No Clan".to_string()),
        kills: number(KILLS).unwrap_or_else(|| fill.kills()),
        matches: number(MATCHES).unwrap_or_else(|| fill.matches()),
        img_url: text(IMG_URL),
        last_seen: text(LAST_SEEN).unwrap_or_else(|| fill.last_seen()),
    })
}

/// First alias holding a usable value. Null, blank and wrongly typed values are skipped.
fn first_of<T>(
    player: &Map<String, Value>,
    aliases: &[&str],
    convert: fn(&Value) -> Option<T>,
) -> Option<T> {
    aliases
        .iter()
        .filter_map(|key| player.get(*key))
        .find_map(convert)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.is_finite())
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Levels outside `u32` are not type-compatible, so the next alias gets a chance.
fn as_level(value: &Value) -> Option<u32> {
    as_number(value).and_then(|n| u32::try_from(n).ok())
}

/// Default values for numeric and timestamp fields under one policy.
struct Fill {
    policy: DefaultPolicy,
}

impl Fill {
    fn new(policy: DefaultPolicy) -> Self {
        Self { policy }
    }

    fn level(&self) -> u32 {
        match self.policy {
            DefaultPolicy::Neutral => 1,
            DefaultPolicy::Synthesized => rand::thread_rng().gen_range(15..=75),
        }
    }

    fn kills(&self) -> u64 {
        match self.policy {
            DefaultPolicy::Neutral => 0,
            DefaultPolicy::Synthesized => rand::thread_rng().gen_range(500..=25_000),
        }
    }

    fn matches(&self) -> u64 {
        match self.policy {
            DefaultPolicy::Neutral => 0,
            DefaultPolicy::Synthesized => rand::thread_rng().gen_range(200..=8_000),
        }
    }

    fn last_seen(&self) -> String {
        match self.policy {
            DefaultPolicy::Neutral => "Unknown".to_string(),
            DefaultPolicy::Synthesized => chrono::Utc::now().to_rfc3339(),
        }
    }
}
