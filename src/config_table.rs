//! Latest [`Config`] per channel. [`ConfigTable`] provides concurrent access for readers (event
//! evaluation) and writers (the configuration stream).
use std::sync::Arc;

use dashmap::DashMap;

use crate::{Config, Error, Result};

/// `ConfigTable` provides a thread-safe (`Sync`) storage for channel configuration.
///
/// The table is sharded by channel, so updates on one channel never block reads or writes on
/// another. Stored configs are immutable and can only be replaced completely.
pub struct ConfigTable {
    configs: DashMap<String, Arc<Config>>,
    default_config: Arc<Config>,
}

impl ConfigTable {
    /// Create an empty table that falls back to `default_config` for unconfigured channels.
    pub fn new(default_config: Config) -> Self {
        ConfigTable {
            configs: DashMap::new(),
            default_config: Arc::new(default_config),
        }
    }

    /// Store `config` as the active config of its channel, returning the previous one.
    pub fn update(&self, config: Config) -> Result<Option<Arc<Config>>> {
        if config.channel.is_empty() {
            return Err(Error::EmptyChannel);
        }

        // Constructing new value before touching the map to minimize lock span.
        let channel = config.channel.clone();
        let new_value = Arc::new(config);

        Ok(self.configs.insert(channel, new_value))
    }

    /// Get the active config for `channel`, or the default config if none was received.
    pub fn get(&self, channel: &str) -> Arc<Config> {
        self.configs
            .get(channel)
            .map(|entry| Arc::clone(entry.value()))
            .unwrap_or_else(|| Arc::clone(&self.default_config))
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.configs.contains_key(channel)
    }

    pub fn default_config(&self) -> &Arc<Config> {
        &self.default_config
    }

    /// Number of explicitly configured channels.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl Default for ConfigTable {
    fn default() -> Self {
        ConfigTable::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::ConfigTable;
    use crate::{Config, Error};

    #[test]
    fn falls_back_to_default_config() {
        let table = ConfigTable::default();

        assert!(!table.contains("NEWCHANNEL"));
        assert_eq!(*table.get("NEWCHANNEL"), Config::default());
    }

    #[test]
    fn last_update_wins_per_channel() {
        let table = ConfigTable::default();

        let previous = table.update(Config::new("APP", "2019-01-01", 1, 4)).unwrap();
        assert!(previous.is_none());

        let previous = table.update(Config::new("APP", "2019-02-01", 2, 6)).unwrap();
        assert_eq!(previous.unwrap().max_purchase_path_length, 4);

        assert_eq!(*table.get("APP"), Config::new("APP", "2019-02-01", 2, 6));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn identical_updates_are_idempotent() {
        let table = ConfigTable::default();
        let config = Config::new("WEB", "2019-01-01", 0, 2);

        table.update(config.clone()).unwrap();
        let before = table.get("WEB");
        table.update(config).unwrap();

        assert_eq!(before, table.get("WEB"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn rejects_empty_channel() {
        let table = ConfigTable::default();

        let err = table.update(Config::new("", "2019-01-01", 0, 3)).unwrap_err();
        assert!(matches!(err, Error::EmptyChannel));
        assert!(table.is_empty());
    }

    #[test]
    fn can_update_configs_from_other_threads() {
        let table = Arc::new(ConfigTable::default());

        let handles: Vec<_> = ["APP", "WEB", "MINI"]
            .into_iter()
            .map(|channel| {
                let table = table.clone();
                std::thread::spawn(move || {
                    for max in 0..100 {
                        table
                            .update(Config::new(channel, "2019-01-01", 0, max))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(table.len(), 3);
        for channel in ["APP", "WEB", "MINI"] {
            assert_eq!(table.get(channel).max_purchase_path_length, 99);
        }
    }
}
