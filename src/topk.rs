//! Top-K selection over run scores
//!
//! **Problem**: `sort(..).head(k)` is O(N log N) even when k is tiny.
//!
//! **Solution**: bounded heap selection, O(N log K), that returns exactly
//! the prefix a stable sort would produce.
//!
//! Ranking rules shared by sorting and selection:
//! - NaN scores rank after every number, in both orders
//! - ties keep input order

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::selector::Direction;

/// Sort order for ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order (smallest first)
    Ascending,
    /// Descending order (largest first)
    Descending,
}

impl SortOrder {
    /// Order that puts the best runs first for a metric direction.
    #[must_use]
    pub const fn best_first(direction: Direction) -> Self {
        match direction {
            Direction::Min => Self::Ascending,
            Direction::Max => Self::Descending,
        }
    }

    /// Order that puts the worst runs first for a metric direction.
    #[must_use]
    pub const fn worst_first(direction: Direction) -> Self {
        match direction {
            Direction::Min => Self::Descending,
            Direction::Max => Self::Ascending,
        }
    }
}

/// Total ranking of `(score, index)` pairs; `Less` means "comes first".
fn rank(a: (f64, usize), b: (f64, usize), order: SortOrder) -> Ordering {
    let by_score = match (a.0.is_nan(), b.0.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        }
    };
    by_score.then(a.1.cmp(&b.1))
}

// Max-heap on rank: the worst of the kept items sits at the top
#[derive(Debug)]
struct RankedItem {
    score: f64,
    index: usize,
    order: SortOrder,
}

impl PartialEq for RankedItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedItem {}

impl Ord for RankedItem {
    fn cmp(&self, other: &Self) -> Ordering {
        rank((self.score, self.index), (other.score, other.index), self.order)
    }
}

impl PartialOrd for RankedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Indices of `scores` in ranked order (a stable sort).
#[must_use]
pub fn sort_indices(scores: &[f64], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| rank((scores[a], a), (scores[b], b), order));
    indices
}

/// Indices of the first `k` entries of the ranked order.
///
/// Time complexity: O(N log K); space: O(K).
///
/// # Examples
///
/// ```rust
/// use ablate_db::topk::{top_k_indices, SortOrder};
///
/// let scores = [0.7, 0.9, f64::NAN, 0.9, 0.1];
/// assert_eq!(top_k_indices(&scores, 3, SortOrder::Descending), vec![1, 3, 0]);
/// assert_eq!(top_k_indices(&scores, 2, SortOrder::Ascending), vec![4, 0]);
/// ```
#[must_use]
pub fn top_k_indices(scores: &[f64], k: usize, order: SortOrder) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }
    if k >= scores.len() {
        return sort_indices(scores, order);
    }

    let mut heap: BinaryHeap<RankedItem> = BinaryHeap::with_capacity(k);
    for (index, &score) in scores.iter().enumerate() {
        let item = RankedItem {
            score,
            index,
            order,
        };
        if heap.len() < k {
            heap.push(item);
        } else if let Some(top) = heap.peek() {
            if item < *top {
                heap.pop();
                heap.push(item);
            }
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|item| item.index)
        .collect()
}
