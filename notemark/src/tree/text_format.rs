//! Inline format bitset carried by text nodes.
//!
//! Flags are independent and combinable. Setting a flag that is already set is a no-op,
//! which is what the inline resolver relies on when nested tags apply the same format twice
//! (e.g. `***x***` followed by an inner `*`).

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TextFormat(u8);

impl TextFormat {
    pub const NONE: TextFormat = TextFormat(0);
    pub const BOLD: TextFormat = TextFormat(1);
    pub const ITALIC: TextFormat = TextFormat(1 << 1);
    pub const STRIKETHROUGH: TextFormat = TextFormat(1 << 2);
    pub const UNDERLINE: TextFormat = TextFormat(1 << 3);
    pub const CODE: TextFormat = TextFormat(1 << 4);

    /// Every single flag, in the order used for display and serialization.
    pub const FLAGS: [(TextFormat, &'static str); 5] = [
        (TextFormat::BOLD, "bold"),
        (TextFormat::ITALIC, "italic"),
        (TextFormat::STRIKETHROUGH, "strikethrough"),
        (TextFormat::UNDERLINE, "underline"),
        (TextFormat::CODE, "code"),
    ];

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every flag of `other` is set in `self`.
    pub const fn contains(self, other: TextFormat) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: TextFormat) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: TextFormat) -> TextFormat {
        TextFormat(self.0 | other.0)
    }

    pub const fn difference(self, other: TextFormat) -> TextFormat {
        TextFormat(self.0 & !other.0)
    }

    pub const fn intersection(self, other: TextFormat) -> TextFormat {
        TextFormat(self.0 & other.0)
    }

    pub fn insert(&mut self, other: TextFormat) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: TextFormat) {
        self.0 &= !other.0;
    }

    pub fn toggle(&mut self, other: TextFormat) {
        self.0 ^= other.0;
    }

    /// Iterate the single flags set in this value.
    pub fn iter(self) -> impl Iterator<Item = TextFormat> {
        Self::FLAGS
            .into_iter()
            .map(|(flag, _)| flag)
            .filter(move |flag| self.contains(*flag))
    }

    /// Names of the set flags, e.g. `["bold", "italic"]`.
    pub fn names(self) -> Vec<&'static str> {
        Self::FLAGS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for TextFormat {
    type Output = TextFormat;

    fn bitor(self, rhs: TextFormat) -> TextFormat {
        self.union(rhs)
    }
}

impl BitOrAssign for TextFormat {
    fn bitor_assign(&mut self, rhs: TextFormat) {
        self.insert(rhs);
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("plain");
        }
        f.write_str(&self.names().join("+"))
    }
}

impl Serialize for TextFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}
