use lasso::{Spur, ThreadedRodeo};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::RefCell;
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for note IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Per-session sequence number, part of every generated ID.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::seed_from_u64(seed()));
}

fn seed() -> u64 {
    let now = chrono::Utc::now();
    now.timestamp_nanos_opt()
        .map(|n| n as u64)
        .unwrap_or_else(|| now.timestamp_millis() as u64)
}

/// Opaque, interned note identifier. Copy, Eq, Hash in O(1).
///
/// Serialized as its plain string form, so IDs written by other clients
/// round-trip unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteId(Spur);

impl NoteId {
    pub fn intern(s: &str) -> Self {
        NoteId(INTERNER.get_or_intern(s))
    }

    /// Look up an already-interned ID without growing the interner.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(NoteId)
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a fresh ID: `note-<millis>-<sequence>-<random>`.
    ///
    /// The time and sequence components make IDs unique within a session;
    /// the random suffix keeps IDs from separate sessions apart.
    pub fn generate(now_ms: i64) -> Self {
        let n = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let random = RNG.with(|rng| rng.borrow_mut().random::<u64>());
        Self::intern(&format!("note-{now_ms}-{n}-{}", base36(random)))
    }
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::with_capacity(13);
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    out.iter().rev().collect()
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self::intern(s)
    }
}

impl fmt::Debug for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NoteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NoteId::intern(&s))
    }
}
