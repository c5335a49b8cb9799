//! Vote tally and flagging rules.
//!
//! Aggregates are always derived from the vote event log, never incremented
//! in place, so recounting an item any number of times gives the same result.

/// Minimum number of counted votes before an item can be flagged
pub const FLAG_MIN_VOTES: i64 = 10;

/// Items below this positive percentage (with enough votes) are flagged
pub const FLAG_MAX_POSITIVE_PERCENTAGE: f64 = 40.0;

/// Derived statistics for one content item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tally {
    pub total_votes: i64,
    pub positive_votes: i64,
    pub negative_votes: i64,
    pub positive_percentage: f64,
    pub is_flagged: bool,
}

impl Tally {
    /// Build a tally from positive and negative event counts.
    /// Star votes are not part of either count.
    pub fn from_counts(positive_votes: i64, negative_votes: i64) -> Self {
        let positive_votes = positive_votes.max(0);
        let negative_votes = negative_votes.max(0);
        let total_votes = positive_votes + negative_votes;
        let positive_percentage = positive_percentage(positive_votes, total_votes);

        Self {
            total_votes,
            positive_votes,
            negative_votes,
            positive_percentage,
            is_flagged: should_flag(total_votes, positive_percentage),
        }
    }
}

/// Percentage of positive votes, rounded to two decimals; 0 with no votes
pub fn positive_percentage(positive_votes: i64, total_votes: i64) -> f64 {
    if total_votes <= 0 {
        return 0.0;
    }
    let raw = positive_votes as f64 / total_votes as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

pub fn should_flag(total_votes: i64, positive_percentage: f64) -> bool {
    total_votes >= FLAG_MIN_VOTES && positive_percentage < FLAG_MAX_POSITIVE_PERCENTAGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_votes() {
        let tally = Tally::from_counts(0, 0);
        assert_eq!(tally.total_votes, 0);
        assert_eq!(tally.positive_percentage, 0.0);
        assert!(!tally.is_flagged);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(positive_percentage(2, 3), 66.67);
        assert_eq!(positive_percentage(1, 3), 33.33);
        assert_eq!(positive_percentage(5, 5), 100.0);
    }

    #[test]
    fn test_flag_threshold_boundaries() {
        // 3 of 9 is 33% but below the vote minimum
        assert!(!Tally::from_counts(3, 6).is_flagged);
        // 3 of 10 is 30% with exactly the minimum
        assert!(Tally::from_counts(3, 7).is_flagged);
        // exactly 40% is not below the threshold
        assert!(!Tally::from_counts(4, 6).is_flagged);
        // 39.99% is
        assert!(should_flag(10_000, 39.99));
    }

    proptest! {
        #[test]
        fn prop_counts_add_up(positive in 0i64..5_000, negative in 0i64..5_000) {
            let tally = Tally::from_counts(positive, negative);
            prop_assert_eq!(tally.positive_votes + tally.negative_votes, tally.total_votes);
            prop_assert!(tally.positive_percentage >= 0.0);
            prop_assert!(tally.positive_percentage <= 100.0);
        }

        #[test]
        fn prop_flagged_iff_rule(positive in 0i64..200, negative in 0i64..200) {
            let tally = Tally::from_counts(positive, negative);
            let expected = tally.total_votes >= FLAG_MIN_VOTES
                && tally.positive_percentage < FLAG_MAX_POSITIVE_PERCENTAGE;
            prop_assert_eq!(tally.is_flagged, expected);
            if tally.total_votes < FLAG_MIN_VOTES {
                prop_assert!(!tally.is_flagged);
            }
        }
    }
}
