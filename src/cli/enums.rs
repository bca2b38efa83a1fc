//! CLI enum types shared with the library.

use clap::ValueEnum;

/// How per-worker frame buffers are combined into one stream at stop time.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Interleave workers in spawn order: worker 0 frame k, worker 1 frame
    /// k, ..., worker 0 frame k+1. Approximates chronological order without
    /// a sort, assuming workers keep similar pace.
    #[default]
    RoundRobin,
    /// Stable sort of all frames by capture timestamp.
    Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_strategy_default_is_round_robin() {
        assert_eq!(MergeStrategy::default(), MergeStrategy::RoundRobin);
    }

    #[test]
    fn test_merge_strategy_value_enum_names() {
        assert_eq!(
            MergeStrategy::from_str("round-robin", false).unwrap(),
            MergeStrategy::RoundRobin
        );
        assert_eq!(
            MergeStrategy::from_str("timestamp", false).unwrap(),
            MergeStrategy::Timestamp
        );
    }
}
