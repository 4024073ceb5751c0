use std::sync::mpsc;

use crate::EvaluatedResult;

/// Receives every emitted [`EvaluatedResult`]. This is the result stream boundary: sinks forward
/// results to storage, alerting or a message bus.
pub trait ResultSink {
    fn emit(&self, result: EvaluatedResult);
}

pub(crate) struct NoopResultSink;
impl ResultSink for NoopResultSink {
    fn emit(&self, _result: EvaluatedResult) {}
}

impl<T: Fn(EvaluatedResult)> ResultSink for T {
    fn emit(&self, result: EvaluatedResult) {
        self(result);
    }
}

/// Forward results into a channel. A disconnected receiver drops results.
impl ResultSink for mpsc::Sender<EvaluatedResult> {
    fn emit(&self, result: EvaluatedResult) {
        if self.send(result).is_err() {
            log::warn!(target: "purchase_path", "result receiver disconnected, dropping result");
        }
    }
}
