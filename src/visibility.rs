//! Visibility contexts (calling search spaces).
//!
//! A visibility is an ordered list of partition names. Membership decides
//! which patterns a caller can reach; order breaks specificity ties. The
//! textual form is colon separated (`"DN:SJC"`), and the empty partition is
//! matched as the empty string but displayed as `NONE`.

use std::collections::HashSet;
use std::fmt;

/// Display token for the empty ("no partition") partition.
pub const NONE_PARTITION: &str = "NONE";

pub(crate) fn display_partition(partition: &str) -> &str {
    if partition.is_empty() { NONE_PARTITION } else { partition }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    order: Vec<String>,
    members: HashSet<String>,
}

impl Visibility {
    /// Parse a colon separated visibility string. An empty token stands for
    /// the empty partition, so `""` parses to `[""]`.
    pub fn parse(text: &str) -> Self {
        Self::from_partitions(text.split(':'))
    }

    pub fn from_partitions<I, S>(partitions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let order: Vec<String> = partitions.into_iter().map(Into::into).collect();
        let members = order.iter().cloned().collect();
        Self { order, members }
    }

    /// Append the empty partition unless it is already present.
    pub fn with_none_partition(mut self) -> Self {
        if !self.members.contains("") {
            self.order.push(String::new());
            self.members.insert(String::new());
        }
        self
    }

    pub fn contains(&self, partition: &str) -> bool {
        self.members.contains(partition)
    }

    /// `true` if any of `partitions` is visible.
    pub fn intersects<'p, I>(&self, partitions: I) -> bool
    where
        I: IntoIterator<Item = &'p String>,
    {
        partitions.into_iter().any(|p| self.members.contains(p.as_str()))
    }

    /// Partitions in caller order, duplicates included.
    pub fn partitions(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Raw colon separated form, as handed to a secondary lookup.
    pub fn to_visibility_string(&self) -> String {
        self.order.join(":")
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.order.iter().map(|p| display_partition(p)).collect();
        f.write_str(&names.join(":"))
    }
}
