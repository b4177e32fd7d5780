//! Sharded string interner for identifier and string-literal storage.
//!
//! Provides O(1) interning and lookup with thread-safe concurrent access
//! via per-shard locking. Separate parses may share one interner; the
//! per-shard locks are the only synchronization needed.

// Arc is needed here for SharedInterner - parses of many files may share
// one interner across threads.
use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Per-shard storage for interned strings.
struct InternShard {
    /// Map from string content to local index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents.
    strings: Vec<&'static str>,
}

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// Shard exceeded capacity (over 256 million strings per shard).
    ShardOverflow { shard_idx: usize, count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::ShardOverflow { shard_idx, count } => write!(
                f,
                "interner shard {shard_idx} exceeded capacity: {count} strings, max is {}",
                Name::MAX_LOCAL
            ),
        }
    }
}

impl std::error::Error for InternError {}

impl InternShard {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        }
    }

    fn with_empty() -> Self {
        let mut shard = Self::new();
        // Pre-intern empty string at index 0
        let empty: &'static str = "";
        shard.map.insert(empty, 0);
        shard.strings.push(empty);
        shard
    }
}

/// Sharded string interner for concurrent access.
///
/// The hit path (`try_intern` on an already-interned string) borrows the
/// caller's `&str` directly against the shard map; no allocation happens
/// unless the string is new.
pub struct StringInterner {
    shards: [RwLock<InternShard>; Name::NUM_SHARDS],
    /// Total count of interned strings across all shards (O(1) `len()`).
    total_count: AtomicUsize,
}

impl StringInterner {
    /// Create a new interner with the Python keywords pre-interned.
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            if i == 0 {
                RwLock::new(InternShard::with_empty())
            } else {
                RwLock::new(InternShard::new())
            }
        });

        // Start with 1 for the empty string pre-interned in shard 0
        let interner = Self {
            shards,
            total_count: AtomicUsize::new(1),
        };
        interner.pre_intern_keywords();
        interner
    }

    /// Compute shard for a string based on its hash.
    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hash = 0u32;
        for byte in s.bytes().take(8) {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        (hash as usize) % Name::NUM_SHARDS
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    #[inline]
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        let shard_idx = Self::shard_for(s);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard_idx is bounded by NUM_SHARDS (16)"
        )]
        let shard_idx_u32 = shard_idx as u32;
        let shard = &self.shards[shard_idx];

        // Fast path: check if already interned
        {
            let guard = shard.read();
            if let Some(&local) = guard.map.get(s) {
                return Ok(Name::new(shard_idx_u32, local));
            }
        }

        // Slow path: need to insert
        let mut guard = shard.write();

        // Double-check after acquiring write lock
        if let Some(&local) = guard.map.get(s) {
            return Ok(Name::new(shard_idx_u32, local));
        }

        // Leak the string to get 'static lifetime
        let owned: String = s.to_owned();
        let leaked: &'static str = Box::leak(owned.into_boxed_str());

        let local = u32::try_from(guard.strings.len()).map_err(|_| InternError::ShardOverflow {
            shard_idx,
            count: guard.strings.len(),
        })?;
        guard.strings.push(leaked);
        guard.map.insert(leaked, local);

        self.total_count.fetch_add(1, Ordering::Relaxed);

        Ok(Name::new(shard_idx_u32, local))
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity. Use `try_intern` for
    /// fallible interning.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Intern an owned String, avoiding a second allocation when the
    /// string is new (the decoded-literal path produces owned strings).
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity.
    pub fn intern_owned(&self, s: String) -> Name {
        let shard_idx = Self::shard_for(&s);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard_idx is bounded by NUM_SHARDS (16)"
        )]
        let shard_idx_u32 = shard_idx as u32;
        let shard = &self.shards[shard_idx];

        {
            let guard = shard.read();
            if let Some(&local) = guard.map.get(s.as_str()) {
                return Name::new(shard_idx_u32, local);
            }
        }

        let mut guard = shard.write();
        if let Some(&local) = guard.map.get(s.as_str()) {
            return Name::new(shard_idx_u32, local);
        }

        let leaked: &'static str = Box::leak(s.into_boxed_str());
        let local = u32::try_from(guard.strings.len())
            .unwrap_or_else(|_| panic!("interner shard {shard_idx} exceeded capacity"));
        guard.strings.push(leaked);
        guard.map.insert(leaked, local);
        self.total_count.fetch_add(1, Ordering::Relaxed);

        Name::new(shard_idx_u32, local)
    }

    /// Look up the string for a Name.
    pub fn lookup(&self, name: Name) -> &str {
        let shard = &self.shards[name.shard()];
        let guard = shard.read();
        guard.strings[name.local()]
    }

    /// Look up the string for a Name, returning a `'static` reference.
    ///
    /// Safe because interned strings are leaked and never deallocated.
    pub fn lookup_static(&self, name: Name) -> &'static str {
        let shard = &self.shards[name.shard()];
        let guard = shard.read();
        guard.strings[name.local()]
    }

    /// Pre-intern the Python keywords and common dunder names.
    fn pre_intern_keywords(&self) {
        const KEYWORDS: &[&str] = &[
            // Reserved words across the supported version range
            "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del",
            "elif", "else", "except", "exec", "finally", "for", "from", "global", "if", "import",
            "in", "is", "lambda", "nonlocal", "not", "or", "pass", "print", "raise", "return",
            "try", "while", "with", "yield", "True", "False", "None",
            // Frequent names
            "self", "cls", "__init__", "__future__", "__name__", "__main__", "__doc__",
            "__file__", "object", "type", "len", "range", "str", "int", "float", "list", "dict",
            "set", "tuple", "Exception", "ValueError", "TypeError",
        ];

        for kw in KEYWORDS {
            self.intern(kw);
        }
    }

    /// Get the number of interned strings (O(1)).
    pub fn len(&self) -> usize {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Check if the interner is empty (only has the empty string).
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for looking up interned string names.
///
/// Higher-level crates can accept any `StringLookup` implementor without
/// depending directly on `StringInterner`.
pub trait StringLookup {
    /// Look up the string for an interned name.
    fn lookup(&self, name: Name) -> &str;
}

impl StringLookup for StringInterner {
    fn lookup(&self, name: Name) -> &str {
        StringInterner::lookup(self, name)
    }
}

/// Shared interner handle for interning across many parses.
///
/// The newtype enforces that all thread-safe interner sharing goes through
/// this type rather than ad hoc `Arc<StringInterner>` usage.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a new shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_and_lookup() {
        let interner = StringInterner::new();

        let hello = interner.intern("hello");
        let world = interner.intern("world");
        let hello2 = interner.intern("hello");

        assert_eq!(hello, hello2);
        assert_ne!(hello, world);

        assert_eq!(interner.lookup(hello), "hello");
        assert_eq!(interner.lookup(world), "world");
    }

    #[test]
    fn empty_string_is_name_empty() {
        let interner = StringInterner::new();
        let empty = interner.intern("");
        assert_eq!(empty, Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    #[test]
    fn keywords_pre_interned() {
        let interner = StringInterner::new();
        let def_name = interner.intern("def");
        let lambda_name = interner.intern("lambda");
        assert_eq!(interner.lookup(def_name), "def");
        assert_eq!(interner.lookup(lambda_name), "lambda");
    }

    #[test]
    fn shared_interner_clones_agree() {
        let interner = SharedInterner::new();
        let interner2 = interner.clone();

        let name1 = interner.intern("shared");
        let name2 = interner2.intern("shared");

        assert_eq!(name1, name2);
    }

    #[test]
    fn intern_owned_deduplicates() {
        let interner = StringInterner::new();
        let name1 = interner.intern("decoded");
        let name2 = interner.intern_owned(String::from("decoded"));
        assert_eq!(name1, name2);
    }
}
