use std::fmt;

use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};
use serde::{Deserialize, Serialize};

use crate::error::RefError;

/// Multicodec code for DAG-JSON content.
const DAG_JSON_CODEC: u64 = 0x0129;

/// Shortest well-formed textual CID (a base58 CIDv0 is exactly 46 characters).
const MIN_REF_LEN: usize = 46;

/// Content-addressed identifier for a stored object.
///
/// A `ContentRef` wraps the textual form of a CID. Identical content always
/// produces the same reference, making objects deduplicatable and cacheable.
/// Construction goes through [`ContentRef::parse`], so a value of this type
/// is always grammatically valid.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    /// Parse and validate a textual content identifier.
    ///
    /// A reference is valid iff it parses under the CID grammar and is at
    /// least 46 characters long.
    pub fn parse(s: &str) -> Result<Self, RefError> {
        if s.len() < MIN_REF_LEN {
            return Err(RefError::TooShort { len: s.len() });
        }
        Cid::try_from(s).map_err(|e| RefError::Invalid(e.to_string()))?;
        Ok(Self(s.to_string()))
    }

    /// Returns `true` if `s` is a valid content identifier. Never panics.
    ///
    /// Callers use this to distinguish link-pointer CID targets from
    /// relative-path targets.
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// Compute a CIDv1 reference (BLAKE3 multihash, DAG-JSON codec) for a blob.
    pub fn for_bytes(data: &[u8]) -> Self {
        let hash = Code::Blake3_256.digest(data);
        Self(Cid::new_v1(DAG_JSON_CODEC, hash).to_string())
    }

    /// The textual form of the reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for log output (last 8 characters).
    ///
    /// CIDs share a long common prefix, so the tail is the distinctive part.
    pub fn short(&self) -> &str {
        let tail = self.0.len().saturating_sub(8);
        &self.0[tail..]
    }
}

impl fmt::Debug for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentRef(..{})", self.short())
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContentRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
