//! Hillock grouping
//!
//! A hillock is a maximal set of adjacent hexes whose center terrain is
//! Hillock. Groups are rebuilt from scratch whenever hex terrain changes,
//! so repeated rebuilds of the same map always yield the same groups.

use ahash::AHashSet;

use super::hex::{adjacent_coord, HexCoord, HEXSIDES};

/// One connected group of hillock hexes.
#[derive(Debug, Clone, Default)]
pub struct Hillock {
    hexes: AHashSet<HexCoord>,
}

impl Hillock {
    pub fn contains(&self, hex: HexCoord) -> bool {
        self.hexes.contains(&hex)
    }

    pub fn hexes(&self) -> impl Iterator<Item = &HexCoord> {
        self.hexes.iter()
    }

    pub fn len(&self) -> usize {
        self.hexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hexes.is_empty()
    }
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        DisjointSet {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // path compression
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Group hillock hexes into maximal connected components.
pub fn build_hillocks(hillock_hexes: &[HexCoord]) -> Vec<Hillock> {
    let index: ahash::AHashMap<HexCoord, usize> = hillock_hexes
        .iter()
        .enumerate()
        .map(|(i, &h)| (h, i))
        .collect();

    let mut sets = DisjointSet::new(hillock_hexes.len());
    for (i, &hex) in hillock_hexes.iter().enumerate() {
        for side in 0..HEXSIDES {
            if let Some(&j) = index.get(&adjacent_coord(hex, side)) {
                sets.union(i, j);
            }
        }
    }

    let mut by_root: ahash::AHashMap<usize, Hillock> = ahash::AHashMap::new();
    for (i, &hex) in hillock_hexes.iter().enumerate() {
        let root = sets.find(i);
        by_root.entry(root).or_default().hexes.insert(hex);
    }

    by_root.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(build_hillocks(&[]).is_empty());
    }

    #[test]
    fn test_single_group() {
        let a = HexCoord::new(2, 2);
        let b = adjacent_coord(a, 2);
        let c = adjacent_coord(b, 3);
        let groups = build_hillocks(&[a, b, c]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
        assert!(groups[0].contains(a));
        assert!(groups[0].contains(c));
    }

    #[test]
    fn test_disconnected_groups() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(10, 10);
        let groups = build_hillocks(&[a, b]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_rebuild_is_stable() {
        let hexes: Vec<HexCoord> = vec![
            HexCoord::new(1, 1),
            HexCoord::new(1, 2),
            HexCoord::new(5, 5),
            HexCoord::new(5, 6),
            HexCoord::new(9, 0),
        ];
        let first = build_hillocks(&hexes);
        let second = build_hillocks(&hexes);
        assert_eq!(first.len(), second.len());
        let count = |groups: &[Hillock], h: HexCoord| {
            groups.iter().filter(|g| g.contains(h)).count()
        };
        for &h in &hexes {
            assert_eq!(count(&first, h), 1);
            assert_eq!(count(&second, h), 1);
        }
    }
}
