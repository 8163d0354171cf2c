//! Character name table and per-character usage counts

use std::fmt;

/// Stable index into the [`Roster`] name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(pub usize);

impl CharacterId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Screen side a portrait template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    /// File-name suffix used for this side's templates.
    pub fn suffix(self) -> &'static str {
        match self {
            Side::Player1 => "-1p",
            Side::Player2 => "-2p",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player1 => f.write_str("P1"),
            Side::Player2 => f.write_str("P2"),
        }
    }
}

/// Ordered character names. Insertion order is reporting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>) -> CharacterId {
        self.names.push(name.into());
        CharacterId(self.names.len() - 1)
    }

    pub fn name(&self, id: CharacterId) -> &str {
        &self.names[id.0]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = CharacterId> + '_ {
        (0..self.names.len()).map(CharacterId)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl<S: Into<String>> FromIterator<S> for Roster {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Title-case a template stem: the first letter of every alphabetic run is
/// upper-cased, the rest lower-cased (`chun-li` -> `Chun-Li`).
pub fn display_name(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut in_word = false;
    for c in stem.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// One reported usage line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRow {
    pub name: String,
    pub count: u32,
}

/// Appearance count per character, indexed like the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageTable {
    counts: Vec<u32>,
}

impl UsageTable {
    pub fn new(characters: usize) -> Self {
        Self {
            counts: vec![0; characters],
        }
    }

    /// Count one appearance of each combatant in a completed match.
    pub fn record_match(&mut self, p1: CharacterId, p2: CharacterId) {
        self.counts[p1.0] += 1;
        self.counts[p2.0] += 1;
    }

    pub fn count(&self, id: CharacterId) -> u32 {
        self.counts[id.0]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Characters that appeared at least once, most used first. Ties keep
    /// roster order.
    pub fn rows(&self, roster: &Roster) -> Vec<UsageRow> {
        let mut rows: Vec<UsageRow> = roster
            .ids()
            .filter(|id| self.counts[id.0] > 0)
            .map(|id| UsageRow {
                name: roster.name(id).to_string(),
                count: self.counts[id.0],
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }
}
