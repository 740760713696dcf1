//! Known-item table.
//!
//! Each tagged object (keys, wallet, …) is registered at start-up from
//! [`KNOWN_ITEMS`](crate::config::KNOWN_ITEMS). When the reader returns a
//! token the registry resolves it by comparing hex renderings,
//! case-insensitively and with exact length, and stamps the matching
//! item's last-seen time.

use core::fmt::Write;

use heapless::{String, Vec};
use log::{debug, info};

/// Longest UID an ISO 14443A card can report (triple-size).
pub const MAX_TOKEN_LEN: usize = 10;

/// Maximum number of registered items.
pub const MAX_ITEMS: usize = 10;

/// Raw UID bytes as returned by the reader.
pub type Token = Vec<u8, MAX_TOKEN_LEN>;

/// Uppercase hex rendering of a token (two chars per byte).
pub type TokenHex = String<{ MAX_TOKEN_LEN * 2 }>;

/// Render a token as uppercase hex, no separators.
pub fn token_hex(token: &[u8]) -> TokenHex {
    let mut s = TokenHex::new();
    for b in token.iter().take(MAX_TOKEN_LEN) {
        let _ = write!(s, "{:02X}", b);
    }
    s
}

/// A registered physical item.
#[derive(Debug, Clone)]
pub struct KnownItem {
    /// Token as hex text; any case.
    pub token: &'static str,
    pub name: &'static str,
    /// `HH:MM DD/MM` of the last recognition, empty if never seen.
    pub last_seen: String<16>,
}

impl KnownItem {
    fn matches(&self, hex: &str) -> bool {
        self.token.len() == hex.len() && self.token.eq_ignore_ascii_case(hex)
    }
}

/// Outcome of resolving a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagIdentity {
    Known { index: usize, name: &'static str },
    Unknown { hex: TokenHex },
}

/// Ordered, fixed-capacity item table.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    items: Vec<KnownItem, MAX_ITEMS>,
    /// Index of the most recently recognised item.
    last_recognised: Option<usize>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a `(token_hex, name)` table. Entries past capacity are dropped.
    pub fn from_table(table: &[(&'static str, &'static str)]) -> Self {
        let mut reg = Self::new();
        for &(token, name) in table {
            if !reg.register(token, name) {
                log::warn!("Registry: full, '{}' not registered", name);
            }
        }
        reg
    }

    /// Add an item. Returns `false` if the table is full.
    pub fn register(&mut self, token: &'static str, name: &'static str) -> bool {
        let item = KnownItem {
            token,
            name,
            last_seen: String::new(),
        };
        if self.items.push(item).is_err() {
            return false;
        }
        debug!("Registry: '{}' -> {}", name, token);
        true
    }

    /// Resolve a token, updating the item's last-seen stamp on a match.
    pub fn resolve(&mut self, token: &[u8], stamp: &str) -> TagIdentity {
        let hex = token_hex(token);
        match self.items.iter().position(|item| item.matches(&hex)) {
            Some(index) => {
                let item = &mut self.items[index];
                item.last_seen.clear();
                let _ = item.last_seen.push_str(stamp);
                self.last_recognised = Some(index);
                info!("Registry: recognised '{}' at {}", item.name, stamp);
                TagIdentity::Known {
                    index,
                    name: item.name,
                }
            }
            None => {
                info!("Registry: unknown token {}", hex);
                TagIdentity::Unknown { hex }
            }
        }
    }

    /// The item most recently recognised, if any.
    pub fn last_recognised(&self) -> Option<&KnownItem> {
        self.last_recognised.and_then(|i| self.items.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&KnownItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
