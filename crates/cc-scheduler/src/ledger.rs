use std::collections::HashMap;

use rand::seq::IteratorRandom;

/// A (white engine index, black engine index) pairing within a contest's
/// roster (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorPair {
    pub white_id: i32,
    pub black_id: i32,
}

/// Remaining-slot counts per color pair, with fair random selection among
/// whichever pairs still have slots left (spec.md §4.8).
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    counts: HashMap<ColorPair, i64>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the ledger for a Match of `games` total games between a pair,
    /// split `ceil(games/2)` non-inverted and `floor(games/2)` inverted,
    /// then reduces both by already-played counts (spec.md §4.8).
    pub fn for_match(games: u32, played_non_inverted: u32, played_inverted: u32) -> Self {
        let mut schedule = Self::new();
        let non_inverted = games.div_ceil(2) as i64 - played_non_inverted as i64;
        let inverted = (games / 2) as i64 - played_inverted as i64;
        schedule.add(ColorPair { white_id: 0, black_id: 1 }, non_inverted);
        schedule.add(ColorPair { white_id: 1, black_id: 0 }, inverted);
        schedule
    }

    pub fn inc(&mut self, k: ColorPair) {
        self.add(k, 1);
    }

    pub fn dec(&mut self, k: ColorPair) -> bool {
        self.add(k, -1)
    }

    /// Adjusts the remaining count for `k` by `delta`. Dropping to zero
    /// removes the key; dropping below zero also removes it and reports
    /// failure.
    pub fn add(&mut self, k: ColorPair, delta: i64) -> bool {
        let entry = self.counts.entry(k).or_insert(0);
        *entry += delta;
        match (*entry).cmp(&0) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => {
                self.counts.remove(&k);
                true
            }
            std::cmp::Ordering::Less => {
                self.counts.remove(&k);
                false
            }
        }
    }

    /// Picks uniformly at random among pairs with remaining slots.
    pub fn peek(&self) -> Option<ColorPair> {
        self.counts
            .keys()
            .copied()
            .choose(&mut rand::rng())
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_match_splits_games_and_subtracts_played() {
        let schedule = Schedule::for_match(5, 1, 0);
        assert!(!schedule.is_empty());
        let mut counts: Vec<_> = schedule.counts.values().copied().collect();
        counts.sort();
        assert_eq!(counts, vec![2, 2]);
    }

    #[test]
    fn add_removes_key_at_zero() {
        let mut schedule = Schedule::new();
        let pair = ColorPair { white_id: 0, black_id: 1 };
        schedule.add(pair, 1);
        assert!(schedule.dec(pair));
        assert!(schedule.is_empty());
    }

    #[test]
    fn add_below_zero_fails_and_removes() {
        let mut schedule = Schedule::new();
        let pair = ColorPair { white_id: 0, black_id: 1 };
        assert!(!schedule.dec(pair));
        assert!(schedule.is_empty());
    }

    #[test]
    fn peek_only_returns_present_keys() {
        let schedule = Schedule::for_match(1, 0, 0);
        let picked = schedule.peek().unwrap();
        assert!(picked == ColorPair { white_id: 0, black_id: 1 });
    }

    #[test]
    fn empty_schedule_peeks_none() {
        assert!(Schedule::new().peek().is_none());
    }
}
