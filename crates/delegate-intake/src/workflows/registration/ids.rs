use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use super::domain::ApplicationId;

/// Unambiguous alphabet: no 0/O, 1/I/L.
const ID_ALPHABET: [char; 31] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'M',
    'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

const RANDOM_LEN: usize = 6;

/// Source of human-readable application identifiers.
///
/// Uniqueness is probabilistic; nothing checks generated ids against stored
/// records.
pub trait ApplicationIdGenerator: Send + Sync + Debug {
    fn generate(&self) -> ApplicationId;
}

/// `<PREFIX>-<yyMMddHHmmss>-<random>` identifiers.
#[derive(Debug, Clone)]
pub struct TimestampIdGenerator {
    prefix: String,
}

impl TimestampIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for TimestampIdGenerator {
    fn default() -> Self {
        Self::new("DLG")
    }
}

impl ApplicationIdGenerator for TimestampIdGenerator {
    fn generate(&self) -> ApplicationId {
        let stamp = Utc::now().format("%y%m%d%H%M%S");
        let random = nanoid::nanoid!(RANDOM_LEN, &ID_ALPHABET);
        ApplicationId(format!("{}-{stamp}-{random}", self.prefix))
    }
}

/// Deterministic `<PREFIX>-000001` style ids, handy for demos and tests.
/// Also counts how many ids were handed out.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }

    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst) - 1
    }
}

impl ApplicationIdGenerator for SequentialIdGenerator {
    fn generate(&self) -> ApplicationId {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        ApplicationId(format!("{}-{id:06}", self.prefix))
    }
}
