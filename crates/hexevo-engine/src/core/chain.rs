//! Chain bookkeeping for win detection.
//!
//! A chain is a maximal group of adjacent same-colored stones. Chains are
//! stored as an index-based union-find over an arena of [`ChainRecord`]s:
//! every stone keeps the [`ChainId`] it was created with, and a record either
//! is a root (the representative of its chain) or forwards to its parent.
//!
//! Only roots carry meaningful [`EdgeMask`]s. A union ORs the two masks into
//! the surviving root, so the mask of a chain is always the OR of the edge
//! memberships of all of its stones, whatever order the merges happened in.

use std::ops::{BitOr, BitOrAssign};

/// Which of its owner's two goal edges a chain touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EdgeMask(u8);

impl EdgeMask {
    pub const NONE: Self = Self(0);
    /// Row 0 or column 0, depending on the owner's axis.
    pub const FIRST: Self = Self(0b01);
    /// Row N-1 or column N-1, depending on the owner's axis.
    pub const SECOND: Self = Self(0b10);
    pub const BOTH: Self = Self(0b11);

    #[must_use]
    pub const fn touches_first(self) -> bool {
        self.0 & Self::FIRST.0 != 0
    }

    #[must_use]
    pub const fn touches_second(self) -> bool {
        self.0 & Self::SECOND.0 != 0
    }

    /// Returns `true` when both goal edges are touched.
    #[must_use]
    pub const fn is_spanning(self) -> bool {
        self.0 == Self::BOTH.0
    }

    /// Exchanges the two edges, as a point reflection of the board does.
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self(((self.0 & 0b01) << 1) | ((self.0 & 0b10) >> 1))
    }
}

impl BitOr for EdgeMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EdgeMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Index of a chain record in a [`ChainArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(u32);

impl ChainId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChainRecord {
    parent: ChainId,
    rank: u8,
    edges: EdgeMask,
}

/// Union-find arena of chain records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainArena {
    records: Vec<ChainRecord>,
}

impl ChainArena {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Number of records ever created since the last [`clear`](Self::clear).
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Creates a singleton chain.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` chains are created.
    pub fn make_chain(&mut self, edges: EdgeMask) -> ChainId {
        let id = ChainId(u32::try_from(self.records.len()).expect("chain arena overflow"));
        self.records.push(ChainRecord {
            parent: id,
            rank: 0,
            edges,
        });
        id
    }

    /// Finds the root of `id` without modifying the arena.
    #[must_use]
    pub fn root(&self, mut id: ChainId) -> ChainId {
        while self.records[id.index()].parent != id {
            id = self.records[id.index()].parent;
        }
        id
    }

    /// Finds the root of `id`, compressing the path behind it.
    pub fn find(&mut self, id: ChainId) -> ChainId {
        let root = self.root(id);
        let mut cursor = id;
        while cursor != root {
            let next = self.records[cursor.index()].parent;
            self.records[cursor.index()].parent = root;
            cursor = next;
        }
        root
    }

    /// Merges the chains containing `a` and `b` and returns the new root.
    ///
    /// The root's edge mask becomes the OR of both masks.
    pub fn union(&mut self, a: ChainId, b: ChainId) -> ChainId {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return ra;
        }
        let (root, child) = match self.records[ra.index()]
            .rank
            .cmp(&self.records[rb.index()].rank)
        {
            std::cmp::Ordering::Less => (rb, ra),
            std::cmp::Ordering::Greater => (ra, rb),
            std::cmp::Ordering::Equal => {
                self.records[ra.index()].rank += 1;
                (ra, rb)
            }
        };
        let child_edges = self.records[child.index()].edges;
        self.records[child.index()].parent = root;
        self.records[root.index()].edges |= child_edges;
        root
    }

    /// Edge mask of the chain containing `id`.
    #[must_use]
    pub fn edges(&self, id: ChainId) -> EdgeMask {
        self.records[self.root(id).index()].edges
    }

    /// Swaps the two goal edges of every chain.
    ///
    /// Non-root records are swapped too, which keeps the operation an
    /// involution on the whole arena.
    pub fn swap_edges(&mut self) {
        for record in &mut self.records {
            record.edges = record.edges.swapped();
        }
    }
}
