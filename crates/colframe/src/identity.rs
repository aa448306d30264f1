//! Advisory identity tags for tracing.
//!
//! A [`StructureIdentity`] is a random 16-bit tag regenerated whenever a
//! table's column set changes. A [`DataIdentity`] is a 64-bit set with one
//! random bit per data generation; merging tables unions their sets.
//!
//! Both are cheap to compute and collide easily: two unrelated generations
//! share a structure tag with probability 1/65536, and a data tag bit with
//! probability 1/64 (much higher after a few merges fill the set). Nothing
//! may depend on them for correctness; they exist for log output.

use rand::Rng;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StructureIdentity(u16);

impl StructureIdentity {
    pub(crate) fn random() -> Self {
        Self(rand::thread_rng().gen())
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DataIdentity(u64);

impl DataIdentity {
    pub(crate) fn random() -> Self {
        Self(1u64 << rand::thread_rng().gen_range(0..64))
    }

    pub(crate) fn union(self, other: DataIdentity) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether the two tags may describe related data.
    pub fn may_share_data(self, other: DataIdentity) -> bool {
        self.0 & other.0 != 0
    }

    pub fn bits(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DataIdentity {
    /// Renders the set bits in base 36, e.g. `|3|a|`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("|")?;
        let mut bits = self.0;
        while bits != 0 {
            let pos = bits.trailing_zeros();
            let digit = char::from_digit(pos % 36, 36).unwrap_or('?');
            if pos >= 36 {
                write!(f, "1{digit}|")?;
            } else {
                write!(f, "{digit}|")?;
            }
            bits &= bits - 1;
        }
        Ok(())
    }
}

impl fmt::Display for StructureIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
