use std::collections::vec_deque::{Iter, VecDeque};
use std::ops::Index;

/// Bounded, time-ordered price history.
///
/// Index 0 is the oldest retained sample. Once `capacity` is exceeded the
/// oldest sample is evicted.
#[derive(Debug, Clone)]
pub struct PriceWindow<P> {
    capacity: usize,
    prices: VecDeque<P>,
}

impl<P: Copy> PriceWindow<P> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            prices: VecDeque::with_capacity(capacity.saturating_add(1)),
        }
    }

    /// Append at the tail, evicting from the head past capacity
    pub fn push(&mut self, price: P) {
        self.prices.push_back(price);
        while self.prices.len() > self.capacity {
            self.prices.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Most recent sample
    pub fn last(&self) -> Option<P> {
        self.prices.back().copied()
    }

    pub fn get(&self, index: usize) -> Option<P> {
        self.prices.get(index).copied()
    }

    pub fn iter(&self) -> Iter<'_, P> {
        self.prices.iter()
    }

    pub fn clear(&mut self) {
        self.prices.clear();
    }
}

impl<P> Index<usize> for PriceWindow<P> {
    type Output = P;

    fn index(&self, index: usize) -> &Self::Output {
        &self.prices[index]
    }
}
