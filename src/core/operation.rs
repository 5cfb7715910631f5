//! The fixed vocabulary of CRUD operations

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five operations a generated service supports.
///
/// Used both as the discriminant of a [`CrudContext`](crate::core::CrudContext)
/// and as the key handed to the `get_options` hook, so dynamic options can
/// react to the operation being performed.
///
/// Serializes to the upper-case tag; deserializing accepts either case, so
/// configuration files may write `detail` or `DETAIL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Detail,
    Create,
    Update,
    Delete,
    List,
}

impl Operation {
    /// All operations, in declaration order
    pub const ALL: [Operation; 5] = [
        Operation::Detail,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::List,
    ];

    /// Upper-case tag (`DETAIL`, `CREATE`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Detail => "DETAIL",
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::List => "LIST",
        }
    }

    /// Lower-case name used in user-facing messages (`detail`, `create`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Detail => "detail",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
        }
    }

    /// True for operations that create or update persisted state
    pub fn is_write(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }

    /// True for operations without mutating or destructive effects
    pub fn is_safe(&self) -> bool {
        matches!(self, Operation::Detail | Operation::List)
    }

    /// Parse a tag, accepting either case
    pub fn parse(s: &str) -> Option<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Operation::parse(&tag).ok_or_else(|| {
            de::Error::unknown_variant(&tag, &["DETAIL", "CREATE", "UPDATE", "DELETE", "LIST"])
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
