use std::collections::BTreeMap;

use chrono::Utc;

use crate::{buffer_store::UserEventBuffer, Config, EvaluatedResult};

/// Users with this many historical purchases or more are never evaluated.
pub const HISTORY_PURCHASE_TIMES_LIMIT: i32 = 10;

impl Config {
    /// Return `true` if a purchase path of `purchase_path_length` events qualifies for
    /// evaluation under this config.
    pub fn is_eligible(&self, purchase_path_length: usize) -> bool {
        self.history_purchase_times < HISTORY_PURCHASE_TIMES_LIMIT
            && i64::try_from(purchase_path_length)
                .map_or(true, |len| len > i64::from(self.max_purchase_path_length))
    }
}

impl UserEventBuffer {
    /// Order buffered events by event time. Events with equal timestamps keep their arrival order.
    pub fn sort_by_event_time(&mut self) {
        self.events.sort_by_key(|event| event.event_time);
    }

    /// Evaluate the purchase path of this buffer under `config`.
    ///
    /// Returns `None` when the path does not pass the eligibility gate. That is a policy outcome,
    /// not an error.
    pub fn evaluate(mut self, channel: &str, config: &Config) -> Option<EvaluatedResult> {
        let purchase_path_length = self.len();
        if !config.is_eligible(purchase_path_length) {
            log::debug!(target: "purchase_path",
                        channel,
                        user_id = self.user_id.as_str(),
                        purchase_path_length,
                        history_purchase_times = config.history_purchase_times,
                        max_purchase_path_length = config.max_purchase_path_length;
                        "purchase path is not eligible for evaluation");
            return None;
        }

        self.sort_by_event_time();

        let mut event_type_counts = BTreeMap::new();
        for event in &self.events {
            *event_type_counts.entry(event.event_type).or_insert(0) += 1;
        }

        let result = EvaluatedResult {
            user_id: self.user_id,
            channel: channel.to_owned(),
            event_type_counts,
            purchase_path_length,
            evaluated_at: Utc::now(),
        };

        log::info!(target: "purchase_path",
                   result:serde;
                   "evaluated purchase path");

        Some(result)
    }
}
