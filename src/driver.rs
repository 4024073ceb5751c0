use std::{
    sync::{mpsc, Arc, PoisonError, RwLock},
    thread::JoinHandle,
};

use crate::{
    partitioner::{Md5Partitioner, Partitioner},
    Error, PurchasePathEvaluator, Result, StreamItem,
};

enum WorkerMessage {
    Item(StreamItem),
    Stop,
}

struct Worker {
    sender: mpsc::Sender<WorkerMessage>,
    join_handle: JoinHandle<()>,
}

/// Feeds both input streams into a [`PurchasePathEvaluator`] from a pool of worker threads.
///
/// Items are partitioned by channel: every config and event of a channel is handled by the same
/// worker, in submission order, while different channels proceed in parallel.
pub struct StreamDriver {
    workers: Vec<Worker>,
    partitioner: Box<dyn Partitioner + Send + Sync>,
    /// Held for reading across each check-and-send in `submit`, so no item can be queued behind
    /// the stop command.
    stopped: RwLock<bool>,
}

impl StreamDriver {
    /// Start `workers` threads feeding `evaluator`.
    pub fn start(evaluator: Arc<PurchasePathEvaluator<'static>>, workers: usize) -> Result<Self> {
        StreamDriver::start_with_partitioner(evaluator, workers, Md5Partitioner)
    }

    /// Start `workers` threads, routing channels with a custom `partitioner`.
    pub fn start_with_partitioner(
        evaluator: Arc<PurchasePathEvaluator<'static>>,
        workers: usize,
        partitioner: impl Partitioner + Send + Sync + 'static,
    ) -> Result<Self> {
        if workers == 0 {
            return Err(Error::InvalidWorkerCount);
        }

        let workers = (0..workers)
            .map(|n| Worker::spawn(n, Arc::clone(&evaluator)))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(target: "purchase_path", workers = workers.len(); "started stream driver");

        Ok(StreamDriver {
            workers,
            partitioner: Box::new(partitioner),
            stopped: RwLock::new(false),
        })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Queue an item for the worker owning its channel.
    pub fn submit(&self, item: StreamItem) -> Result<()> {
        let stopped = self.stopped.read().unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            return Err(Error::DriverStopped);
        }

        // Partitioners returning an index out of range still land on a worker.
        let n = self
            .partitioner
            .partition(item.channel(), self.workers.len())
            % self.workers.len();
        // Send error means that the worker thread exited.
        self.workers[n]
            .sender
            .send(WorkerMessage::Item(item))
            .map_err(|_| Error::DriverStopped)
    }

    /// Stop the worker threads. Items submitted before this call are still processed.
    ///
    /// This function does not wait for the threads to actually stop.
    pub fn stop(&self) {
        let mut stopped = self.stopped.write().unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            return;
        }
        *stopped = true;
        for worker in &self.workers {
            // Error means that the worker already exited. Nothing useful to do.
            let _ = worker.sender.send(WorkerMessage::Stop);
        }
    }

    /// Stop the worker threads and block waiting for them to exit.
    ///
    /// If you don't need to wait for the threads to exit, use [`StreamDriver::stop`] instead.
    pub fn shutdown(self) -> Result<()> {
        // Send stop signal in case it wasn't sent before.
        self.stop();

        let mut result = Ok(());
        for worker in self.workers {
            if worker.join_handle.join().is_err() {
                result = Err(Error::DriverThreadPanicked);
            }
        }
        result
    }
}

impl Worker {
    fn spawn(n: usize, evaluator: Arc<PurchasePathEvaluator<'static>>) -> Result<Worker> {
        let (sender, receiver) = mpsc::channel::<WorkerMessage>();

        let join_handle = std::thread::Builder::new()
            .name(format!("purchase-path-worker-{n}"))
            .spawn(move || {
                for message in receiver {
                    match message {
                        WorkerMessage::Item(item) => {
                            if let Err(err) = evaluator.process(item) {
                                log::warn!(target: "purchase_path", worker = n; "dropped stream item: {}", err);
                            }
                        }
                        WorkerMessage::Stop => {
                            log::debug!(target: "purchase_path", worker = n; "worker received stop command");
                            return;
                        }
                    }
                }
            })?;

        Ok(Worker {
            sender,
            join_handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{mpsc, Arc};

    use super::StreamDriver;
    use crate::{
        partitioner::Partitioner, Config, Error, Event, EventType, EvaluatorConfig, StreamItem,
    };

    struct SingleWorker;
    impl Partitioner for SingleWorker {
        fn partition(&self, _key: &str, _partitions: usize) -> usize {
            0
        }
    }

    struct OutOfRange;
    impl Partitioner for OutOfRange {
        fn partition(&self, _key: &str, partitions: usize) -> usize {
            partitions + 5
        }
    }

    #[test]
    fn rejects_zero_workers() {
        let evaluator = Arc::new(EvaluatorConfig::new().to_evaluator());
        assert!(matches!(
            StreamDriver::start(evaluator, 0),
            Err(Error::InvalidWorkerCount)
        ));
    }

    #[test]
    fn processes_items_submitted_before_shutdown() {
        let (sender, receiver) = mpsc::channel();
        let evaluator = Arc::new(EvaluatorConfig::new().result_sink(sender).to_evaluator());
        let driver = StreamDriver::start(evaluator.clone(), 4).unwrap();
        assert_eq!(driver.workers(), 4);

        driver
            .submit(StreamItem::Config(Config::new("WEB", "2019-01-01", 0, 1)))
            .unwrap();
        for (time, event_type) in [EventType::View, EventType::Purchase].into_iter().enumerate() {
            driver
                .submit(Event::new("lisi", "WEB", event_type, time as i64).into())
                .unwrap();
        }
        driver.shutdown().unwrap();

        let results: Vec<_> = receiver.try_iter().collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].channel, "WEB");
        assert_eq!(results[0].purchase_path_length, 2);
        assert!(evaluator.buffers().is_empty());
    }

    #[test]
    fn rejects_items_after_stop() {
        let evaluator = Arc::new(EvaluatorConfig::new().to_evaluator());
        let driver = StreamDriver::start_with_partitioner(evaluator, 2, SingleWorker).unwrap();

        driver.stop();
        assert!(matches!(
            driver.submit(Event::new("lisi", "APP", EventType::View, 1).into()),
            Err(Error::DriverStopped)
        ));
        driver.shutdown().unwrap();
    }

    #[test]
    fn invalid_items_do_not_stop_workers() {
        let (sender, receiver) = mpsc::channel();
        let evaluator = Arc::new(EvaluatorConfig::new().result_sink(sender).to_evaluator());
        let driver = StreamDriver::start_with_partitioner(evaluator, 1, SingleWorker).unwrap();

        driver
            .submit(StreamItem::Config(Config::new("", "2019-01-01", 0, 0)))
            .unwrap();
        driver
            .submit(StreamItem::Config(Config::new("APP", "2019-01-01", 0, 0)))
            .unwrap();
        driver
            .submit(Event::new("lisi", "APP", EventType::Purchase, 1).into())
            .unwrap();
        driver.shutdown().unwrap();

        assert_eq!(receiver.try_iter().count(), 1);
    }

    #[test]
    fn out_of_range_partition_wraps_to_a_worker() {
        let (sender, receiver) = mpsc::channel();
        let evaluator = Arc::new(
            EvaluatorConfig::new()
                .default_config(Config::new("APP", "2018-01-01", 0, 0))
                .result_sink(sender)
                .to_evaluator(),
        );
        let driver = StreamDriver::start_with_partitioner(evaluator, 2, OutOfRange).unwrap();

        driver
            .submit(Event::new("lisi", "APP", EventType::Purchase, 1).into())
            .unwrap();
        driver.shutdown().unwrap();

        assert_eq!(receiver.try_iter().count(), 1);
    }

    #[test]
    fn accepted_items_are_processed_when_stop_races_submit() {
        let (sender, receiver) = mpsc::channel();
        let evaluator = Arc::new(
            EvaluatorConfig::new()
                .default_config(Config::new("APP", "2018-01-01", 0, 0))
                .result_sink(sender)
                .to_evaluator(),
        );
        let driver = Arc::new(StreamDriver::start(evaluator, 4).unwrap());

        let submitters: Vec<_> = (0..4)
            .map(|n| {
                let driver = driver.clone();
                std::thread::spawn(move || {
                    let mut accepted = 0usize;
                    for time in 0..500 {
                        // Every purchase qualifies on its own, so each accepted item yields one result.
                        let event = Event::new(format!("user-{n}-{time}"), "APP", EventType::Purchase, time);
                        if driver.submit(event.into()).is_ok() {
                            accepted += 1;
                        }
                    }
                    accepted
                })
            })
            .collect();

        std::thread::yield_now();
        driver.stop();

        let accepted: usize = submitters
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .sum();
        let Ok(driver) = Arc::try_unwrap(driver) else {
            panic!("driver still shared after submitters joined");
        };
        driver.shutdown().unwrap();

        assert_eq!(receiver.try_iter().count(), accepted);
    }
}
