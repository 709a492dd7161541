/// Trailblazer levels and the worst rank that still earns them,
/// from the top level down.
pub const LEVEL_THRESHOLDS: [(u8, u64); 14] = [
    (14, 77),
    (13, 777),
    (12, 3_888),
    (11, 7_776),
    (10, 15_300),
    (9, 30_720),
    (8, 46_085),
    (7, 61_447),
    (6, 76_809),
    (5, 138_256),
    (4, 199_703),
    (3, 261_151),
    (2, 322_598),
    (1, 384_045),
];

/// Highest level whose rank bound covers `rank`.
///
/// Rank 0 means unranked and maps to level 0, as does any rank past the
/// last bound.
pub fn level_for_rank(rank: u64) -> u8 {
    if rank == 0 {
        return 0;
    }
    LEVEL_THRESHOLDS
        .iter()
        .find(|(_, max_rank)| *max_rank >= rank)
        .map(|(level, _)| *level)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unranked_is_level_zero() {
        assert_eq!(level_for_rank(0), 0);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert_eq!(level_for_rank(1), 14);
        assert_eq!(level_for_rank(77), 14);
        assert_eq!(level_for_rank(78), 13);
        assert_eq!(level_for_rank(384_045), 1);
        assert_eq!(level_for_rank(384_046), 0);
    }

    #[test]
    fn test_better_rank_never_lowers_level() {
        let mut previous = level_for_rank(1);
        for rank in (1..400_000u64).step_by(97) {
            let level = level_for_rank(rank);
            assert!(level <= previous, "rank {rank} jumped to level {level}");
            previous = level;
        }
    }
}
