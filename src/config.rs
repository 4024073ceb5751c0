use crate::{result_sink::NoopResultSink, Config, PurchasePathEvaluator, ResultSink};

/// Configuration for [`PurchasePathEvaluator`].
pub struct EvaluatorConfig<'a> {
    pub(crate) default_config: Config,
    pub(crate) result_sink: Box<dyn ResultSink + Send + Sync + 'a>,
}

impl<'a> EvaluatorConfig<'a> {
    /// Create an evaluator configuration that uses [`Config::default`] for unconfigured channels
    /// and discards results.
    ///
    /// ```
    /// # use purchase_path::EvaluatorConfig;
    /// EvaluatorConfig::new();
    /// ```
    pub fn new() -> Self {
        EvaluatorConfig {
            default_config: Config::default(),
            result_sink: Box::new(NoopResultSink),
        }
    }

    /// Override the config used for channels that never received one.
    pub fn default_config(mut self, default_config: Config) -> Self {
        self.default_config = default_config;
        self
    }

    /// Set the sink receiving evaluated results.
    ///
    /// ```
    /// # use purchase_path::{EvaluatedResult, EvaluatorConfig};
    /// let config = EvaluatorConfig::new().result_sink(|result: EvaluatedResult| {
    ///   println!("{:?}", result);
    /// });
    /// ```
    pub fn result_sink(mut self, result_sink: impl ResultSink + Send + Sync + 'a) -> Self {
        self.result_sink = Box::new(result_sink);
        self
    }

    /// Create a new [`PurchasePathEvaluator`] using the specified configuration.
    ///
    /// ```
    /// # use purchase_path::{EvaluatorConfig, PurchasePathEvaluator};
    /// let evaluator: PurchasePathEvaluator = EvaluatorConfig::new().to_evaluator();
    /// ```
    pub fn to_evaluator(self) -> PurchasePathEvaluator<'a> {
        PurchasePathEvaluator::new(self)
    }
}

impl Default for EvaluatorConfig<'_> {
    fn default() -> Self {
        EvaluatorConfig::new()
    }
}
