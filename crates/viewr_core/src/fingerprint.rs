use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::FormId;

/// 32-bit change fingerprint of a serialized form.
///
/// Computed as `h = h * 31 + unit` over the UTF-16 code units of the text,
/// wrapping at `i32`. Collisions are an accepted risk; the value only has to
/// tell "same as last sent" from "different".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(i32);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        let hash = text
            .encode_utf16()
            .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)));
        Self(hash)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// Compares against a value read back from the key-value store.
    ///
    /// Missing or unparsable entries never match, so they always trigger a save.
    pub fn matches_stored(self, stored: Option<&str>) -> bool {
        stored
            .and_then(|raw| raw.parse::<Fingerprint>().ok())
            .is_some_and(|previous| previous == self)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i32>().map(Self)
    }
}

/// Key under which the last sent fingerprint of `form` is stored.
pub fn storage_key(form: &FormId) -> String {
    format!("{}_last_hash", form.selector())
}
