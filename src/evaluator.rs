use std::sync::Arc;

use crate::{
    buffer_store::EventBufferStore, config_table::ConfigTable, result_sink::ResultSink, Config,
    EvaluatedResult, Event, EvaluatorConfig, Result, StreamItem,
};

/// Joins the event stream against the configuration stream and evaluates purchase paths.
///
/// In order to create an evaluator instance, first create [`EvaluatorConfig`].
///
/// # Examples
/// ```
/// # use purchase_path::{Config, Event, EventType, EvaluatorConfig};
/// let evaluator = EvaluatorConfig::new().to_evaluator();
///
/// evaluator.process_config(Config::new("APP", "2018-01-01", 0, 1)).unwrap();
/// evaluator.process_event(Event::new("lisi", "APP", EventType::View, 1));
/// let result = evaluator.process_event(Event::new("lisi", "APP", EventType::Purchase, 2));
///
/// assert_eq!(result.unwrap().purchase_path_length, 2);
/// ```
pub struct PurchasePathEvaluator<'a> {
    config_table: Arc<ConfigTable>,
    buffers: EventBufferStore,
    result_sink: Box<dyn ResultSink + Send + Sync + 'a>,
}

impl<'a> PurchasePathEvaluator<'a> {
    /// Create a new `PurchasePathEvaluator` using the specified configuration.
    pub fn new(config: EvaluatorConfig<'a>) -> Self {
        PurchasePathEvaluator {
            config_table: Arc::new(ConfigTable::new(config.default_config)),
            buffers: EventBufferStore::new(),
            result_sink: config.result_sink,
        }
    }

    /// Create an evaluator reading channel configs from an externally owned `config_table`.
    ///
    /// The table's own default config applies; `config.default_config` is ignored.
    pub fn with_config_table(config: EvaluatorConfig<'a>, config_table: Arc<ConfigTable>) -> Self {
        PurchasePathEvaluator {
            config_table,
            buffers: EventBufferStore::new(),
            result_sink: config.result_sink,
        }
    }

    pub fn config_table(&self) -> &Arc<ConfigTable> {
        &self.config_table
    }

    pub fn buffers(&self) -> &EventBufferStore {
        &self.buffers
    }

    /// Route an item of either input stream.
    pub fn process(&self, item: StreamItem) -> Result<Option<EvaluatedResult>> {
        match item {
            StreamItem::Config(config) => {
                self.process_config(config)?;
                Ok(None)
            }
            StreamItem::Event(event) => Ok(self.process_event(event)),
        }
    }

    /// Apply a configuration stream item. Events evaluated afterwards on that channel use it.
    pub fn process_config(&self, config: Config) -> Result<()> {
        let channel = config.channel.clone();
        let old_config = self.config_table.update(config.clone()).inspect_err(|err| {
            log::warn!(target: "purchase_path",
                       config:serde;
                       "rejected config: {:?}", err);
        })?;

        match old_config {
            Some(old_config) => {
                log::debug!(target: "purchase_path",
                            channel = channel.as_str(),
                            old_config:serde = *old_config,
                            new_config:serde = config;
                            "replaced channel config");
            }
            None => {
                log::debug!(target: "purchase_path",
                            channel = channel.as_str(),
                            default_config:serde = **self.config_table.default_config(),
                            new_config:serde = config;
                            "configured channel for the first time");
            }
        }

        Ok(())
    }

    /// Apply an event stream item.
    ///
    /// Returns the result emitted to the sink if the event was a qualifying purchase.
    pub fn process_event(&self, event: Event) -> Option<EvaluatedResult> {
        let is_purchase = event.is_purchase();
        let channel = event.channel.clone();
        let user_id = event.user_id.clone();

        let buffered = self.buffers.append(event);
        log::trace!(target: "purchase_path",
                    channel = channel.as_str(),
                    user_id = user_id.as_str(),
                    buffered;
                    "buffered event");

        if !is_purchase {
            return None;
        }

        let config = self.config_table.get(&channel);
        log::info!(target: "purchase_path",
                   channel = channel.as_str(),
                   user_id = user_id.as_str(),
                   config:serde = *config;
                   "received a purchase event");

        let result = self
            .buffers
            .evaluate_and_clear(&channel, &user_id, &config)?;

        self.result_sink.emit(result.clone());
        Some(result)
    }
}
