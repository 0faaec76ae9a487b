//! Interned identifiers for entity keys.
//!
//! Every domain, system and table is addressed by an [`Id`]. Ids are cheap to
//! copy, hash and compare, which keeps the entity registry lookups on the
//! ingestion path free of string allocations.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Symbol table backing every [`Id`].
///
/// This is an append-only string table; it holds no graph state.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Interned string identifier.
///
/// # Examples
///
/// ```
/// use lineage_core::identifier::Id;
///
/// let domain = Id::new("Finance");
/// let system = domain.join(Id::new("Ledger"), "-");
/// assert_eq!(system, "Finance-Ledger");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string slice, interning it on first use.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Joins two identifiers with `separator` into a new identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage_core::identifier::Id;
    ///
    /// let key = Id::new("Domain1").join(Id::new("SystemA"), "-");
    /// assert_eq!(key, "Domain1-SystemA");
    /// ```
    pub fn join(self, other: Id, separator: &str) -> Self {
        let joined = format!("{self}{separator}{other}");
        Self::new(&joined)
    }

    /// Returns an owned copy of the interned string.
    pub fn to_owned_string(self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_owned()
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_owned_string())
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
