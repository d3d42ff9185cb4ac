// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{CandidateMetadata, CandidateProvider, CompletionCandidate, CompletionQuery,
            matches_prefix};

/// Names of shell builtins, w/ an optional one line help.
#[derive(Debug, Clone, Default)]
pub struct BuiltinProvider {
    entries: Vec<(String, Option<String>)>,
}

impl BuiltinProvider {
    #[must_use]
    pub fn new<N: Into<String>>(entries: impl IntoIterator<Item = (N, Option<String>)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, help)| (name.into(), help))
                .collect(),
        }
    }
}

impl CandidateProvider for BuiltinProvider {
    fn label(&self) -> &'static str { "loading builtins" }

    fn token_type_aliases(&self) -> &'static [&'static str] { &["ShBuiltin", "Builtin"] }

    fn collect(
        &self,
        query: &CompletionQuery,
        token_type: &str,
    ) -> miette::Result<Vec<CompletionCandidate>> {
        Ok(self
            .entries
            .iter()
            .filter(|(name, _)| matches_prefix(name, &query.prefix))
            .map(|(name, help)| CompletionCandidate {
                value: name.clone(),
                token_type: token_type.to_string(),
                metadata: CandidateMetadata::Builtin {
                    label: name.clone(),
                    description: name.clone(),
                    help_text: help.clone(),
                },
            })
            .collect())
    }
}
