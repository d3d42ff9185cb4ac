// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The source of a candidate. Declaration order is also the order of specificity: when
/// two sources offer the same value, the later kind wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString,
    Serialize, Deserialize,
)]
pub enum CandidateKind {
    Command,
    ExternalSymbol,
    SnippetTrigger,
    Folder,
    Builtin,
}

/// What the completion popup shows next to a candidate. Copied into the [`crate::Token`]
/// when the candidate is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CandidateMetadata {
    Folder {
        label: String,
        description: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preview_entry: Option<String>,
    },
    Builtin {
        label: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        help_text: Option<String>,
    },
    Command {
        label: String,
        /// Full path of the executable.
        description: String,
    },
    SnippetTrigger {
        label: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        snippet_name: Option<String>,
    },
    ExternalSymbol {
        label: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        symbol_kind: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
}

impl CandidateMetadata {
    #[must_use]
    pub fn kind(&self) -> CandidateKind {
        match self {
            CandidateMetadata::Folder { .. } => CandidateKind::Folder,
            CandidateMetadata::Builtin { .. } => CandidateKind::Builtin,
            CandidateMetadata::Command { .. } => CandidateKind::Command,
            CandidateMetadata::SnippetTrigger { .. } => CandidateKind::SnippetTrigger,
            CandidateMetadata::ExternalSymbol { .. } => CandidateKind::ExternalSymbol,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            CandidateMetadata::Folder { label, .. }
            | CandidateMetadata::Builtin { label, .. }
            | CandidateMetadata::Command { label, .. }
            | CandidateMetadata::SnippetTrigger { label, .. }
            | CandidateMetadata::ExternalSymbol { label, .. } => label,
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            CandidateMetadata::Folder { description, .. }
            | CandidateMetadata::Builtin { description, .. }
            | CandidateMetadata::Command { description, .. }
            | CandidateMetadata::SnippetTrigger { description, .. }
            | CandidateMetadata::ExternalSymbol { description, .. } => description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCandidate {
    /// Text written into the line on commit.
    pub value: String,
    /// Type given to the committed token.
    pub token_type: String,
    pub metadata: CandidateMetadata,
}

impl CompletionCandidate {
    #[must_use]
    pub fn kind(&self) -> CandidateKind { self.metadata.kind() }
}

/// Case insensitive prefix match.
#[must_use]
pub fn matches_prefix(name: &str, prefix: &str) -> bool {
    name.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Keeps one candidate per value, the most specific kind (see [`CandidateKind`]). On a
/// tie the first one seen is kept. Order of first appearance is preserved.
#[must_use]
pub fn dedupe_candidates(candidates: Vec<CompletionCandidate>) -> Vec<CompletionCandidate> {
    let mut acc: Vec<CompletionCandidate> = Vec::with_capacity(candidates.len());
    let mut seen: HashMap<String, usize> = HashMap::new();
    for candidate in candidates {
        match seen.get(&candidate.value) {
            Some(&index) => {
                if candidate.kind() > acc[index].kind() {
                    acc[index] = candidate;
                }
            }
            None => {
                seen.insert(candidate.value.clone(), acc.len());
                acc.push(candidate);
            }
        }
    }
    acc
}

/// Case insensitive, then case sensitive to break ties.
pub fn sort_candidates(candidates: &mut [CompletionCandidate]) {
    candidates.sort_by(|lhs, rhs| {
        lhs.value
            .to_lowercase()
            .cmp(&rhs.value.to_lowercase())
            .then_with(|| lhs.value.cmp(&rhs.value))
    });
}

#[cfg(test)]
pub mod test_candidates {
    use super::*;

    pub fn builtin(value: &str) -> CompletionCandidate {
        CompletionCandidate {
            value: value.into(),
            token_type: "Builtin".into(),
            metadata: CandidateMetadata::Builtin {
                label: value.into(),
                description: value.into(),
                help_text: None,
            },
        }
    }

    pub fn command(value: &str) -> CompletionCandidate {
        CompletionCandidate {
            value: value.into(),
            token_type: "Command".into(),
            metadata: CandidateMetadata::Command {
                label: value.into(),
                description: format!("/usr/bin/{value}"),
            },
        }
    }
}
