//! Link disposition labels and their bitmask encoding.
//!
//! Every recognized label owns one bit, including `follow`, so that any label set survives an
//! encode/decode round trip. The crawler writes a different convention in raw `bitmask` columns,
//! where `0` means "follow" and the other labels are shifted down by one bit:
//! [`DispositionSet::from_crawler_bits`] and [`DispositionSet::to_crawler_bits`] convert between
//! the two.

use crate::error::LrError;
use itertools::Itertools;
use std::collections::BTreeSet;

/// Separator used between labels in a combination key.
pub const COMBINATION_SEPARATOR: &str = "_";

/// Recognized labels, in lexicographic order of their names.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Disposition {
    Config,
    Follow,
    Link,
    Meta,
    Robots,
}

pub const ALL_DISPOSITIONS: [Disposition; 5] = [
    Disposition::Config,
    Disposition::Follow,
    Disposition::Link,
    Disposition::Meta,
    Disposition::Robots,
];

impl Disposition {
    pub fn label(self) -> &'static str {
        match self {
            Disposition::Config => "config",
            Disposition::Follow => "follow",
            Disposition::Link => "link",
            Disposition::Meta => "meta",
            Disposition::Robots => "robots",
        }
    }

    pub fn bit(self) -> u32 {
        match self {
            Disposition::Follow => 1,
            Disposition::Link => 2,
            Disposition::Meta => 4,
            Disposition::Robots => 8,
            Disposition::Config => 16,
        }
    }

    pub fn from_label(label: &str) -> Result<Self, LrError> {
        ALL_DISPOSITIONS
            .iter()
            .copied()
            .find(|disposition| disposition.label() == label)
            .ok_or_else(|| LrError::UnknownDispositionLabel(label.to_owned()))
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

const KNOWN_BITS: u32 = 0b1_1111;
const KNOWN_CRAWLER_BITS: u32 = KNOWN_BITS >> 1;

/// A set of dispositions stored as a bitmask.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct DispositionSet {
    bits: u32,
}

impl DispositionSet {
    pub const FOLLOW: DispositionSet = DispositionSet { bits: 1 };

    pub fn from_bits(bits: u32) -> Result<Self, LrError> {
        if bits & !KNOWN_BITS == 0 {
            Ok(DispositionSet { bits })
        } else {
            Err(LrError::UnknownDispositionBits(bits))
        }
    }

    /// Reads a raw crawler bitmask, where an empty mask means "follow".
    pub fn from_crawler_bits(raw: u32) -> Result<Self, LrError> {
        if raw & !KNOWN_CRAWLER_BITS != 0 {
            return Err(LrError::UnknownDispositionBits(raw));
        }
        if raw == 0 {
            Ok(DispositionSet::FOLLOW)
        } else {
            Ok(DispositionSet { bits: raw << 1 })
        }
    }

    /// The crawler representation of this set. `follow` has no bit of its own there.
    pub fn to_crawler_bits(self) -> u32 {
        self.bits >> 1
    }

    pub fn bits(self) -> u32 {
        self.bits
    }

    pub fn contains(self, disposition: Disposition) -> bool {
        self.bits & disposition.bit() != 0
    }

    pub fn insert(&mut self, disposition: Disposition) {
        self.bits |= disposition.bit();
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// A link is followed only when `follow` is its one and only disposition.
    pub fn is_follow(self) -> bool {
        self == DispositionSet::FOLLOW
    }

    /// The crawler was prevented from fetching the destination by robots.txt or its own config.
    pub fn blocked_by_policy(self) -> bool {
        self.contains(Disposition::Robots) || self.contains(Disposition::Config)
    }

    /// Members in lexicographic label order.
    pub fn iter(self) -> impl Iterator<Item = Disposition> {
        ALL_DISPOSITIONS.iter().copied().filter(move |disposition| self.contains(*disposition))
    }

    pub fn combination_key(self) -> String {
        self.iter().map(Disposition::label).join(COMBINATION_SEPARATOR)
    }
}

impl std::iter::FromIterator<Disposition> for DispositionSet {
    fn from_iter<I: IntoIterator<Item = Disposition>>(iter: I) -> Self {
        let mut set = DispositionSet::default();
        for disposition in iter {
            set.insert(disposition);
        }
        set
    }
}

/// Encodes a set of labels into a bitmask. Unknown labels are rejected.
pub fn encode<'a, I: IntoIterator<Item = &'a str>>(labels: I) -> Result<u32, LrError> {
    labels
        .into_iter()
        .map(Disposition::from_label)
        .collect::<Result<DispositionSet, LrError>>()
        .map(DispositionSet::bits)
}

/// Decodes a bitmask into its labels. Masks with unknown bits are rejected.
pub fn decode(mask: u32) -> Result<BTreeSet<&'static str>, LrError> {
    Ok(DispositionSet::from_bits(mask)?.iter().map(Disposition::label).collect())
}

/// Canonical key of a label set: labels sorted and joined, independent of input order.
pub fn combination_key<'a, I: IntoIterator<Item = &'a str>>(labels: I) -> Result<String, LrError> {
    Ok(DispositionSet::from_bits(encode(labels)?)?.combination_key())
}
