//! Weighted sampling without replacement.
//!
//! A `Distribution` holds the numbers not yet presented in a session, each
//! with a positive weight. Draws remove the item, so every added item comes
//! back exactly once over the distribution's lifetime, with probability
//! proportional to its weight at the time of the draw. The walk order over
//! entries is insertion order, but that is an implementation detail; only
//! the probability guarantee is contractual.

use rand::Rng;

#[derive(Debug, Clone, Default)]
pub struct Distribution {
    entries: Vec<(u32, f64)>,
    total_weight: f64,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item. Weight must be positive; items are assumed unique
    /// (one entry per number in a group).
    pub fn add(&mut self, item: u32, weight: f64) {
        debug_assert!(weight > 0.0, "weight must be positive, got {weight}");
        self.entries.push((item, weight));
        self.total_weight += weight;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Weight of a specific item, if present.
    pub fn weight_of(&self, item: u32) -> Option<f64> {
        self.entries.iter().find(|(i, _)| *i == item).map(|(_, w)| *w)
    }

    /// Remove and return one item, drawn with probability proportional to
    /// its weight. Returns None when the distribution is empty.
    pub fn pop_random(&mut self) -> Option<u32> {
        self.pop_with(&mut rand::thread_rng())
    }

    /// Like `pop_random` but with an explicit RNG, for deterministic tests.
    pub fn pop_with<R: Rng>(&mut self, rng: &mut R) -> Option<u32> {
        if self.entries.is_empty() {
            return None;
        }

        let r = rng.gen_range(0.0..self.total_weight);
        let mut acc = 0.0;
        let mut chosen = self.entries.len() - 1; // rounding fallback

        for (idx, (_, weight)) in self.entries.iter().enumerate() {
            acc += weight;
            if acc > r {
                chosen = idx;
                break;
            }
        }

        let (item, weight) = self.entries.remove(chosen);
        self.total_weight -= weight;
        if self.entries.is_empty() {
            self.total_weight = 0.0;
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn pop_returns_each_item_exactly_once() {
        let mut dist = Distribution::new();
        for item in [5, 7, 11] {
            dist.add(item, 1.0);
        }
        assert_eq!(dist.len(), 3);

        let mut seen = HashSet::new();
        while let Some(item) = dist.pop_random() {
            assert!(seen.insert(item), "{item} drawn twice");
        }
        assert_eq!(seen, HashSet::from([5, 7, 11]));
        assert!(dist.is_empty());
        assert_eq!(dist.pop_random(), None);
    }

    #[test]
    fn total_weight_tracks_entries() {
        let mut dist = Distribution::new();
        dist.add(2, 0.5);
        dist.add(3, 1.0);
        dist.add(4, 0.25);
        assert!((dist.total_weight() - 1.75).abs() < 1e-12);

        let mut rng = StdRng::seed_from_u64(7);
        dist.pop_with(&mut rng);
        dist.pop_with(&mut rng);

        let remaining: f64 = [2, 3, 4]
            .iter()
            .filter_map(|&i| dist.weight_of(i))
            .sum();
        assert!((dist.total_weight() - remaining).abs() < 1e-12);
        assert_eq!(dist.len(), 1);
    }

    #[test]
    fn heavier_items_are_drawn_first_more_often() {
        let mut first_draws = [0u32; 2];
        for seed in 0..400 {
            let mut dist = Distribution::new();
            dist.add(0, 9.0);
            dist.add(1, 1.0);
            let mut rng = StdRng::seed_from_u64(seed);
            let first = dist.pop_with(&mut rng).unwrap();
            first_draws[first as usize] += 1;
        }
        // Item 0 carries 90% of the weight; well clear of a coin flip.
        assert!(
            first_draws[0] > 300,
            "heavy item drawn first only {} / 400 times",
            first_draws[0]
        );
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut dist = Distribution::new();
        assert!(dist.is_empty());
        assert_eq!(dist.pop_random(), None);
        assert_eq!(dist.total_weight(), 0.0);
    }

    #[test]
    fn single_entry_is_always_drawn() {
        for seed in 0..16 {
            let mut dist = Distribution::new();
            dist.add(42, 0.1);
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(dist.pop_with(&mut rng), Some(42));
            assert!(dist.is_empty());
        }
    }
}
