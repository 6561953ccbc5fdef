//! Element identifiers backed by a global string interner.
//!
//! Every element id that flows through the engine (card ids, child ids,
//! action references) is interned once, so lookups, cache keys and
//! comparisons are integer operations.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// An interned element identifier.
///
/// # Examples
///
/// ```
/// use deckstyle_core::identifier::Id;
///
/// let pip = Id::new("pip_1");
/// assert_eq!(pip, "pip_1");
///
/// let renamed = pip.with_prefix(Id::new("ace_spade"));
/// assert_eq!(renamed, "ace_spade_pip_1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates the id `<prefix>_<self>`.
    ///
    /// Used when an element is cloned out of a reference and its descendants
    /// need ids that cannot collide with the originals.
    pub fn with_prefix(&self, prefix: Id) -> Self {
        let mut interner = interner();
        let prefix_str = interner
            .resolve(prefix.0)
            .expect("Prefix ID should exist in interner");
        let self_str = interner
            .resolve(self.0)
            .expect("ID should exist in interner");
        let renamed = format!("{prefix_str}_{self_str}");
        Self(interner.get_or_intern(&renamed))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let str_value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        write!(f, "{}", str_value)
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// # Examples
    ///
    /// ```
    /// use deckstyle_core::identifier::Id;
    ///
    /// let id: Id = "back".into();
    /// assert_eq!(id, "back");
    /// ```
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        let self_str = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        self_str == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
