//! The set of posting identities already processed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::PostingIdentity;

/// Identities of postings processed in this or earlier runs.
///
/// Entries are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet(BTreeSet<PostingIdentity>);

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &PostingIdentity) -> bool {
        self.0.contains(identity)
    }

    /// Record an identity. Returns `true` if it was not present.
    pub fn add(&mut self, identity: PostingIdentity) -> bool {
        self.0.insert(identity)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostingIdentity> {
        self.0.iter()
    }
}

impl FromIterator<PostingIdentity> for SeenSet {
    fn from_iter<I: IntoIterator<Item = PostingIdentity>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
