use dashmap::DashMap;

use crate::{Config, EvaluatedResult, Event};

/// Identifies the buffer of one user on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferKey {
    pub channel: String,
    pub user_id: String,
}

impl BufferKey {
    pub fn new(channel: impl Into<String>, user_id: impl Into<String>) -> Self {
        BufferKey {
            channel: channel.into(),
            user_id: user_id.into(),
        }
    }
}

/// Events a user accumulated on a channel since their last purchase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserEventBuffer {
    pub(crate) user_id: String,
    pub(crate) events: Vec<Event>,
}

impl UserEventBuffer {
    pub fn new(user_id: impl Into<String>) -> Self {
        UserEventBuffer {
            user_id: user_id.into(),
            events: Vec::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Keyed event buffers, one per `(channel, user_id)`.
///
/// Operations on different keys never block each other. Each key is expected to be driven by a
/// single logical writer at a time, in arrival order.
#[derive(Default)]
pub struct EventBufferStore {
    buffers: DashMap<BufferKey, UserEventBuffer>,
}

impl EventBufferStore {
    pub fn new() -> Self {
        EventBufferStore::default()
    }

    /// Append `event` to the buffer of its user and channel, creating the buffer on first use.
    ///
    /// Returns the buffer length after the append.
    pub fn append(&self, event: Event) -> usize {
        let key = BufferKey::new(event.channel.as_str(), event.user_id.as_str());
        let mut buffer = self
            .buffers
            .entry(key)
            .or_insert_with(|| UserEventBuffer::new(event.user_id.as_str()));
        buffer.push(event);
        buffer.len()
    }

    /// Evaluate the buffer of `user_id` on `channel` against `config` and clear it.
    ///
    /// The buffer is removed from the store before evaluation, so an append that races with this
    /// call always starts a fresh buffer. The buffer is cleared whether or not a result is
    /// produced.
    pub fn evaluate_and_clear(
        &self,
        channel: &str,
        user_id: &str,
        config: &Config,
    ) -> Option<EvaluatedResult> {
        let (_key, buffer) = self.buffers.remove(&BufferKey::new(channel, user_id))?;
        log::debug!(target: "purchase_path",
                    channel,
                    user_id,
                    buffered = buffer.len();
                    "cleared user event buffer");
        buffer.evaluate(channel, config)
    }

    /// Number of events buffered for `user_id` on `channel`.
    pub fn buffered_len(&self, channel: &str, user_id: &str) -> usize {
        self.buffers
            .get(&BufferKey::new(channel, user_id))
            .map(|buffer| buffer.len())
            .unwrap_or(0)
    }

    /// Number of live buffers across all channels.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
