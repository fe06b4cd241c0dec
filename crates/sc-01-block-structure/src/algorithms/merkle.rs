//! # Binary Merkle Root
//!
//! Pairwise SHA-256 reduction used for every block commitment.
//!
//! - No leaves: the zero digest
//! - One leaf: the leaf itself
//! - Otherwise each level pairs neighbours left to right, duplicating the
//!   last node of an odd-length level, and hashes `left || right`
//!
//! Leaves are hashed as given; callers pass ids or digests, never raw data.

use serde::{Deserialize, Serialize};
use shared_crypto::sha256_many;
use shared_types::Digest;

/// Parent node of two children.
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    Digest(sha256_many(&[left.as_bytes(), right.as_bytes()]))
}

/// Merkle root of `leaves`.
pub fn merkle_root(leaves: &[Digest]) -> Digest {
    match leaves {
        [] => Digest::zero(),
        [single] => *single,
        _ => {
            let mut level = leaves.to_vec();
            while level.len() > 1 {
                level = next_level(&level);
            }
            level[0]
        }
    }
}

fn next_level(level: &[Digest]) -> Vec<Digest> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            [last] => hash_pair(last, last),
            _ => unreachable!("chunks(2) yields one or two nodes"),
        })
        .collect()
}

/// Which side of the parent the sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiblingSide {
    Left,
    Right,
}

/// Inclusion proof for one leaf: the sibling path from leaf to root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf_index: usize,
    pub path: Vec<(SiblingSide, Digest)>,
}

impl MerkleProof {
    /// Build the proof for `leaves[index]`, or `None` if out of range.
    pub fn generate(leaves: &[Digest], index: usize) -> Option<Self> {
        if index >= leaves.len() {
            return None;
        }

        let mut path = Vec::new();
        let mut level = leaves.to_vec();
        let mut position = index;

        while level.len() > 1 {
            let sibling = if position % 2 == 0 {
                // Last node of an odd level is paired with itself
                let node = level.get(position + 1).unwrap_or(&level[position]);
                (SiblingSide::Right, *node)
            } else {
                (SiblingSide::Left, level[position - 1])
            };
            path.push(sibling);

            level = next_level(&level);
            position /= 2;
        }

        Some(Self {
            leaf_index: index,
            path,
        })
    }

    /// Root implied by this proof for `leaf`.
    pub fn compute_root(&self, leaf: &Digest) -> Digest {
        self.path
            .iter()
            .fold(*leaf, |node, (side, sibling)| match side {
                SiblingSide::Left => hash_pair(sibling, &node),
                SiblingSide::Right => hash_pair(&node, sibling),
            })
    }

    pub fn verify(&self, leaf: &Digest, root: &Digest) -> bool {
        self.compute_root(leaf) == *root
    }
}
