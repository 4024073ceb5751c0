use std::sync::Arc;

use purchase_path::{
    adapter::JsonLinesSink, Config, Event, EventType, EvaluatorConfig, StreamDriver, StreamItem,
};

pub fn main() -> purchase_path::Result<()> {
    env_logger::init();

    // Results are written to stdout as JSON lines.
    let evaluator = EvaluatorConfig::new()
        .result_sink(JsonLinesSink::new(std::io::stdout()))
        .to_evaluator();

    // Start worker threads. Items of one channel are always handled by the same worker.
    let driver = StreamDriver::start(Arc::new(evaluator), 2)?;

    driver.submit(StreamItem::Config(Config::new("APP", "2018-01-01", 0, 3)))?;

    for (time, event_type) in [
        EventType::View,
        EventType::Click,
        EventType::AddCart,
        EventType::Click,
        EventType::Purchase,
    ]
    .into_iter()
    .enumerate()
    {
        driver.submit(Event::new("lisi", "APP", event_type, time as i64).into())?;
    }

    // Too short to qualify: nothing is written, but the buffer is still cleared.
    driver.submit(Event::new("zhangsan", "APP", EventType::View, 1).into())?;
    driver.submit(Event::new("zhangsan", "APP", EventType::Purchase, 2).into())?;

    driver.shutdown()
}
