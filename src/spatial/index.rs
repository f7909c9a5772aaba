//! Bounding-box index for candidate-pair prefiltering
//!
//! Uses an R-tree (via `rstar`) so pairwise geometry checks only run on
//! elements whose boxes actually touch, instead of every n² pair.

use rstar::{RTree, RTreeObject, AABB};

use crate::layout::perimeter::BoundingBox;

/// Index entry: caller-side element index plus its box
#[derive(Debug, Clone)]
struct BoxEntry {
    index: usize,
    bounds: AABB<[f64; 2]>,
}

impl RTreeObject for BoxEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

fn to_aabb(bbox: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y])
}

/// Static R-tree over element bounding boxes
pub struct BoxIndex {
    tree: RTree<BoxEntry>,
    count: usize,
}

impl std::fmt::Debug for BoxIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxIndex")
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl BoxIndex {
    /// Bulk-load from `(element index, box)` pairs
    pub fn new(boxes: impl IntoIterator<Item = (usize, BoundingBox)>) -> Self {
        let entries: Vec<BoxEntry> = boxes
            .into_iter()
            .map(|(index, bbox)| BoxEntry {
                index,
                bounds: to_aabb(&bbox),
            })
            .collect();
        let count = entries.len();
        Self {
            tree: RTree::bulk_load(entries),
            count,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Indices whose boxes intersect `bbox` (touching counts)
    pub fn query(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&to_aabb(bbox))
            .map(|entry| entry.index)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Every unordered pair `(a, b)` with `a < b` whose boxes intersect
    ///
    /// Sorted, so callers report in a stable order.
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for entry in self.tree.iter() {
            for other in self.tree.locate_in_envelope_intersecting(&entry.bounds) {
                if entry.index < other.index {
                    pairs.push((entry.index, other.index));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[test]
    fn test_candidate_pairs_skip_disjoint_boxes() {
        let index = BoxIndex::new(vec![
            (0, bbox(0.0, 0.0, 100.0, 100.0)),
            (1, bbox(50.0, 50.0, 150.0, 150.0)),
            (2, bbox(500.0, 500.0, 600.0, 600.0)),
            (3, bbox(100.0, 0.0, 200.0, 40.0)),
        ]);
        assert_eq!(index.len(), 4);
        assert_eq!(index.candidate_pairs(), vec![(0, 1), (0, 3)]);
    }

    #[test]
    fn test_query_returns_sorted_hits() {
        let index = BoxIndex::new(vec![
            (7, bbox(0.0, 0.0, 10.0, 10.0)),
            (2, bbox(5.0, 5.0, 20.0, 20.0)),
        ]);
        assert_eq!(index.query(&bbox(6.0, 6.0, 8.0, 8.0)), vec![2, 7]);
        assert!(index.query(&bbox(30.0, 30.0, 40.0, 40.0)).is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = BoxIndex::new(Vec::new());
        assert!(index.is_empty());
        assert!(index.candidate_pairs().is_empty());
    }
}
