//! JSON-lines adapters at the edges of the evaluator.
//!
//! Input lines hold one externally tagged [`StreamItem`] each:
//!
//! ```text
//! {"config":{"channel":"APP","effectiveDate":"2018-01-01","historyPurchaseTimes":0,"maxPurchasePathLength":3}}
//! {"event":{"userId":"lisi","channel":"APP","eventType":"VIEW","eventTime":1}}
//! ```
//!
//! Event types are validated here, so the evaluator only ever sees known [`EventType`]s.
use std::{
    io::{BufRead, Write},
    sync::Mutex,
};

use serde::Deserialize;

use crate::{Config, EvaluatedResult, Event, EventType, Result, ResultSink, StreamItem};

/// Wire form of [`StreamItem`] with the event type left unparsed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum RawStreamItem {
    Config(Config),
    Event(RawEvent),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    user_id: String,
    channel: String,
    event_type: String,
    event_time: i64,
}

impl TryFrom<RawEvent> for Event {
    type Error = crate::Error;

    fn try_from(raw: RawEvent) -> Result<Self> {
        Ok(Event {
            event_type: raw.event_type.parse::<EventType>()?,
            user_id: raw.user_id,
            channel: raw.channel,
            event_time: raw.event_time,
        })
    }
}

/// Decode a single JSON line into a [`StreamItem`].
pub fn parse_stream_item(line: &str) -> Result<StreamItem> {
    let raw: RawStreamItem = serde_json::from_str(line)?;
    Ok(match raw {
        RawStreamItem::Config(config) => StreamItem::Config(config),
        RawStreamItem::Event(event) => StreamItem::Event(event.try_into()?),
    })
}

/// Iterate the stream items of a JSON-lines `reader`, skipping blank lines.
///
/// A malformed line yields an error for that line only; iteration continues with the next one.
pub fn read_stream_items<R: BufRead>(reader: R) -> impl Iterator<Item = Result<StreamItem>> {
    reader.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(parse_stream_item(&line)),
        Err(err) => Some(Err(err.into())),
    })
}

/// Writes each result as one JSON line.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        // A poisoned lock still holds a usable writer.
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_result(&self, result: &EvaluatedResult) -> Result<()> {
        let line = serde_json::to_string(result)?;
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn emit(&self, result: EvaluatedResult) {
        if let Err(err) = self.write_result(&result) {
            log::warn!(target: "purchase_path",
                       user_id = result.user_id.as_str(),
                       channel = result.channel.as_str();
                       "failed to write evaluated result: {}", err);
        }
    }
}
