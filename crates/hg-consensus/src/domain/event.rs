//! Gossiped events and their compact descriptors

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{Hash, HashDisplay, NodeId, Timestamp};
use std::fmt;
use std::hash::{Hash as StdHash, Hasher};

/// Anything that carries a birth round, the ordering key of the event window.
pub trait BirthRound {
    fn birth_round(&self) -> u64;
}

/// Compact reference to an event: creator, hash and claimed birth round.
///
/// Two descriptors are equal iff their hashes are equal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EventDescriptor {
    pub hash: Hash,
    pub creator: NodeId,
    pub birth_round: u64,
}

impl EventDescriptor {
    pub fn new(hash: Hash, creator: NodeId, birth_round: u64) -> Self {
        Self {
            hash,
            creator,
            birth_round,
        }
    }
}

impl PartialEq for EventDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for EventDescriptor {}

impl StdHash for EventDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl BirthRound for EventDescriptor {
    fn birth_round(&self) -> u64 {
        self.birth_round
    }
}

impl fmt::Display for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} br{} {})",
            self.creator,
            self.birth_round,
            HashDisplay(&self.hash)
        )
    }
}

/// Immutable event as delivered by the gossip layer.
///
/// Parents are listed self parent first (when present), then other parents.
/// The signature is carried through untouched; verification happens upstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEvent {
    creator: NodeId,
    time_created: Timestamp,
    birth_round: u64,
    parents: Vec<EventDescriptor>,
    transactions: Vec<Vec<u8>>,
    signature: Vec<u8>,
    hash: Hash,
}

impl PlatformEvent {
    /// Build an event and compute its content hash.
    pub fn new(
        creator: NodeId,
        time_created: Timestamp,
        birth_round: u64,
        parents: Vec<EventDescriptor>,
        transactions: Vec<Vec<u8>>,
        signature: Vec<u8>,
    ) -> Self {
        let hash = Self::compute_hash(creator, time_created, birth_round, &parents, &transactions);
        Self {
            creator,
            time_created,
            birth_round,
            parents,
            transactions,
            signature,
            hash,
        }
    }

    /// Build an event whose hash was already computed by the gossip layer.
    pub fn with_hash(
        creator: NodeId,
        time_created: Timestamp,
        birth_round: u64,
        parents: Vec<EventDescriptor>,
        transactions: Vec<Vec<u8>>,
        signature: Vec<u8>,
        hash: Hash,
    ) -> Self {
        Self {
            creator,
            time_created,
            birth_round,
            parents,
            transactions,
            signature,
            hash,
        }
    }

    /// SHA-256 over a length-prefixed little-endian encoding of the hashed fields.
    pub fn compute_hash(
        creator: NodeId,
        time_created: Timestamp,
        birth_round: u64,
        parents: &[EventDescriptor],
        transactions: &[Vec<u8>],
    ) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(creator.id().to_le_bytes());
        hasher.update(time_created.as_nanos().to_le_bytes());
        hasher.update(birth_round.to_le_bytes());
        hasher.update((parents.len() as u64).to_le_bytes());
        for parent in parents {
            hasher.update(parent.hash);
            hasher.update(parent.creator.id().to_le_bytes());
            hasher.update(parent.birth_round.to_le_bytes());
        }
        hasher.update((transactions.len() as u64).to_le_bytes());
        for tx in transactions {
            hasher.update((tx.len() as u64).to_le_bytes());
            hasher.update(tx);
        }
        hasher.finalize().into()
    }

    pub fn creator(&self) -> NodeId {
        self.creator
    }

    pub fn time_created(&self) -> Timestamp {
        self.time_created
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn parents(&self) -> &[EventDescriptor] {
        &self.parents
    }

    /// First parent, if it was created by the same node.
    pub fn self_parent(&self) -> Option<&EventDescriptor> {
        self.parents.first().filter(|p| p.creator == self.creator)
    }

    /// Parents other than the self parent, in declared order.
    pub fn other_parents(&self) -> &[EventDescriptor] {
        match self.self_parent() {
            Some(_) => &self.parents[1..],
            None => &self.parents,
        }
    }

    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.transactions
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn descriptor(&self) -> EventDescriptor {
        EventDescriptor::new(self.hash, self.creator, self.birth_round)
    }
}

impl BirthRound for PlatformEvent {
    fn birth_round(&self) -> u64 {
        self.birth_round
    }
}

impl fmt::Display for PlatformEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}
