use std::time::{Duration, Instant};

/// Execution statistics for a batch inference run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Total execution time.
    pub total_time: Duration,
    /// Number of items processed.
    pub items_processed: usize,
}

impl PipelineStats {
    /// Create a new stats tracker (call at start of operation).
    pub(crate) fn start() -> PipelineStatsBuilder {
        PipelineStatsBuilder {
            start_time: Instant::now(),
        }
    }

    /// Average throughput in items per second.
    pub fn items_per_second(&self) -> f64 {
        let secs = self.total_time.as_secs_f64();
        if secs > 0.0 {
            self.items_processed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Builder for PipelineStats - tracks timing from creation to finalize.
pub(crate) struct PipelineStatsBuilder {
    start_time: Instant,
}

impl PipelineStatsBuilder {
    /// Finalize stats with the number of items processed.
    pub fn finish(self, items_processed: usize) -> PipelineStats {
        PipelineStats {
            total_time: self.start_time.elapsed(),
            items_processed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineStats;

    #[test]
    fn records_item_count_and_elapsed() {
        let builder = PipelineStats::start();
        let stats = builder.finish(8);
        assert_eq!(stats.items_processed, 8);
        assert!(stats.items_per_second() >= 0.0);
    }

    #[test]
    fn zero_duration_rate_is_zero() {
        let stats = PipelineStats {
            total_time: std::time::Duration::ZERO,
            items_processed: 3,
        };
        assert_eq!(stats.items_per_second(), 0.0);
    }
}
