//! Display-name resolution for a record's author.
//!
//! The name is not part of the species record; it is looked up in the profile
//! directory and cached for as long as the owning session lives. A lookup is
//! started at most once per mount. A failed lookup leaves the cache empty and
//! re-arms it; a lookup that finds no profile does not.

use crate::{Outcome, Result};

/// A started display-name lookup. Hand it back to
/// [`EditSession::complete_author_lookup`](crate::EditSession::complete_author_lookup)
/// together with the directory's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorLookup {
    pub author: String,
    pub(crate) epoch: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AuthorNameCache {
    author: Option<String>,
    name: Option<String>,
    attempted_epoch: Option<u64>,
}

impl AuthorNameCache {
    /// The cached name, only if it belongs to `author`.
    pub(crate) fn get(&self, author: &str) -> Option<&str> {
        if self.author.as_deref() == Some(author) {
            self.name.as_deref()
        } else {
            None
        }
    }

    pub(crate) fn begin(&mut self, author: &str, epoch: u64) -> Option<AuthorLookup> {
        if self.author.as_deref() != Some(author) {
            *self = Self { author: Some(author.to_string()), ..Self::default() };
        }
        if self.name.is_some() || self.attempted_epoch == Some(epoch) {
            return None;
        }
        self.attempted_epoch = Some(epoch);
        Some(AuthorLookup { author: author.to_string(), epoch })
    }

    pub(crate) fn complete(
        &mut self,
        lookup: &AuthorLookup,
        epoch: u64,
        result: Result<Option<String>>,
    ) -> Outcome {
        if lookup.epoch != epoch || self.author.as_deref() != Some(lookup.author.as_str()) {
            return Outcome::Stale;
        }
        match result {
            Ok(Some(name)) => {
                self.name = Some(name);
                Outcome::Applied
            }
            Ok(None) => {
                log::debug!("no profile found for author {}", lookup.author);
                Outcome::Applied
            }
            Err(e) => {
                self.attempted_epoch = None;
                Outcome::Failed(e.user_message())
            }
        }
    }
}
