use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage-assigned post identifier.
pub type PostId = i64;

/// Opaque identity of an authenticated caller.
///
/// Only the numeric id is meaningful here: it is the authorization subject for
/// mutations and the owner reference stored on every post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub i64);

impl ActorId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for ActorId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActorId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}
