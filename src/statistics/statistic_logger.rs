use std::fmt::Display;

use itertools::Itertools;

use super::statistic_logging::log_statistic;

/// Prepends a prefix to every statistic it logs; used to scope the counters
/// of nested components (e.g. `worker_3_nodes`).
#[derive(Debug, Default, Clone)]
pub struct StatisticLogger {
    name_prefix: String,
}

impl StatisticLogger {
    pub fn new<Input: IntoIterator<Item = impl Display>>(name_prefix: Input) -> Self {
        Self {
            name_prefix: name_prefix.into_iter().join("_"),
        }
    }

    /// A new logger whose prefix is extended with `addition`.
    pub fn attach_to_prefix(&self, addition: impl Display) -> Self {
        Self {
            name_prefix: format!("{}_{addition}", self.name_prefix),
        }
    }

    pub fn log_statistic(&self, name: impl Display, value: impl Display) {
        if self.name_prefix.is_empty() {
            log_statistic(name, value);
        } else {
            log_statistic(format!("{}_{name}", self.name_prefix), value);
        }
    }
}
