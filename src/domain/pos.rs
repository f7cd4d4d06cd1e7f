use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PosId(pub u64);

impl fmt::Display for PosId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<PosId> for u64 {
    fn from(id: PosId) -> Self {
        id.0
    }
}

/// A point of sale that can be reviewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pos {
    pub id: PosId,
    pub name: String,
}

impl Pos {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: PosId(id),
            name: name.into(),
        }
    }
}
