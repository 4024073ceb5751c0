use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Per-channel evaluation parameters, delivered on the configuration stream.
///
/// A channel's active config is the last one received for that channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub channel: String,
    pub effective_date: String,
    pub history_purchase_times: i32,
    /// Paths must be strictly longer than this to qualify. Negative values admit every path.
    pub max_purchase_path_length: i32,
}

impl Config {
    /// Channel named by [`Config::default`].
    pub const DEFAULT_CHANNEL: &'static str = "APP";
    /// Effective date named by [`Config::default`].
    pub const DEFAULT_EFFECTIVE_DATE: &'static str = "2018-01-01";

    pub fn new(
        channel: impl Into<String>,
        effective_date: impl Into<String>,
        history_purchase_times: i32,
        max_purchase_path_length: i32,
    ) -> Self {
        Config {
            channel: channel.into(),
            effective_date: effective_date.into(),
            history_purchase_times,
            max_purchase_path_length,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(Self::DEFAULT_CHANNEL, Self::DEFAULT_EFFECTIVE_DATE, 0, 3)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    View,
    Click,
    AddCart,
    RemoveCart,
    Purchase,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::View => "VIEW",
            EventType::Click => "CLICK",
            EventType::AddCart => "ADD_CART",
            EventType::RemoveCart => "REMOVE_CART",
            EventType::Purchase => "PURCHASE",
        }
    }

    pub fn all() -> [EventType; 5] {
        [
            EventType::View,
            EventType::Click,
            EventType::AddCart,
            EventType::RemoveCart,
            EventType::Purchase,
        ]
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::all()
            .into_iter()
            .find(|event_type| event_type.as_str() == s)
            .ok_or_else(|| Error::UnknownEventType(s.to_owned()))
    }
}

/// A single user action on a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub user_id: String,
    pub channel: String,
    pub event_type: EventType,
    /// Logical timestamp used to order a purchase path.
    pub event_time: i64,
}

impl Event {
    pub fn new(
        user_id: impl Into<String>,
        channel: impl Into<String>,
        event_type: EventType,
        event_time: i64,
    ) -> Self {
        Event {
            user_id: user_id.into(),
            channel: channel.into(),
            event_type,
            event_time,
        }
    }

    pub fn is_purchase(&self) -> bool {
        self.event_type == EventType::Purchase
    }
}

/// Outcome of a qualifying purchase path evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedResult {
    pub user_id: String,
    /// Channel of the purchase event that triggered the evaluation. The applied config's channel
    /// is never used, so [`Config::DEFAULT_CHANNEL`] only shows up for events on that channel.
    pub channel: String,
    pub event_type_counts: BTreeMap<EventType, usize>,
    pub purchase_path_length: usize,
    pub evaluated_at: DateTime<Utc>,
}

/// One item of either input stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, From)]
#[serde(rename_all = "camelCase")]
pub enum StreamItem {
    Config(Config),
    Event(Event),
}

impl StreamItem {
    /// Partition key shared by both streams.
    pub fn channel(&self) -> &str {
        match self {
            StreamItem::Config(config) => &config.channel,
            StreamItem::Event(event) => &event.channel,
        }
    }
}
