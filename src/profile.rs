//! Operator profiles: commit notes and the never-MFC list
//!
//! Profiles are keyed by operator name and kept next to the basket. A note
//! is free text attached to a commit. A commit on an operator's never-MFC
//! list is hidden from that operator's pending view; other operators still
//! see it.

use crate::message::extract_mfc_notes;
use crate::types::{Commit, CommitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Text an operator attached to a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitNote {
    pub commit: CommitId,
    pub text: String,
}

/// One operator's notes and never-MFC list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Commits this operator will not merge
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub never_mfc: Vec<CommitId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<CommitNote>,
}

impl Profile {
    /// Note on `id`, if any
    pub fn note(&self, id: &CommitId) -> Option<&str> {
        self.notes
            .iter()
            .find(|note| &note.commit == id)
            .map(|note| note.text.as_str())
    }

    /// Attach `text` to `id`, replacing an existing note
    pub fn set_note(&mut self, id: &CommitId, text: impl Into<String>) {
        let text = text.into();
        match self.notes.iter_mut().find(|note| &note.commit == id) {
            Some(note) => note.text = text,
            None => self.notes.push(CommitNote {
                commit: id.clone(),
                text,
            }),
        }
    }

    /// Drop the note on `id`. Returns true if there was one.
    pub fn remove_note(&mut self, id: &CommitId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| &note.commit != id);
        self.notes.len() != before
    }

    pub fn is_never_mfc(&self, id: &CommitId) -> bool {
        self.never_mfc.contains(id)
    }

    /// Put `id` on the never-MFC list. Returns false if it was already there.
    pub fn add_never_mfc(&mut self, id: &CommitId) -> bool {
        if self.is_never_mfc(id) {
            return false;
        }
        self.never_mfc.push(id.clone());
        true
    }

    /// Take `id` off the never-MFC list. Returns true if it was listed.
    pub fn remove_never_mfc(&mut self, id: &CommitId) -> bool {
        let before = self.never_mfc.len();
        self.never_mfc.retain(|listed| listed != id);
        self.never_mfc.len() != before
    }

    /// Whether the profile holds nothing worth saving
    pub fn is_empty(&self) -> bool {
        self.never_mfc.is_empty() && self.notes.is_empty()
    }
}

/// All operator profiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profiles {
    #[serde(default)]
    pub operators: BTreeMap<String, Profile>,
}

impl Profiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile of `operator`, if one was ever saved
    pub fn get(&self, operator: &str) -> Option<&Profile> {
        self.operators.get(operator)
    }

    /// Profile of `operator`, created on first use
    pub fn entry(&mut self, operator: &str) -> &mut Profile {
        self.operators.entry(operator.to_string()).or_default()
    }

    /// Drop profiles left empty after removals
    pub fn prune(&mut self) {
        self.operators.retain(|_, profile| !profile.is_empty());
    }

    /// Seed notes from the `X-MFC*:` lines of newly imported commits.
    ///
    /// Each note goes to the profile of the commit's author. A commit the
    /// author already annotated keeps its note. Returns the number of notes
    /// added.
    pub fn seed_notes<'a>(&mut self, commits: impl IntoIterator<Item = &'a Commit>) -> usize {
        let mut seeded = 0;
        for commit in commits {
            let Some(text) = extract_mfc_notes(&commit.message) else {
                continue;
            };
            let profile = self.entry(&commit.author);
            if profile.note(&commit.id).is_some() {
                continue;
            }
            profile.set_note(&commit.id, text);
            seeded += 1;
            debug!(commit = %commit.id, author = %commit.author, "seeded note");
        }
        seeded
    }
}
