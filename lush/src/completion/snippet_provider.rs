// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{CandidateMetadata, CandidateProvider, CompletionCandidate, CompletionQuery,
            ShellConfig, matches_prefix};

/// Snippet triggers from the `snippets` section of the shell config.
#[derive(Debug, Clone, Default)]
pub struct SnippetProvider {
    /// Trigger and its description (`what`).
    triggers: Vec<(String, Option<String>)>,
}

impl SnippetProvider {
    #[must_use]
    pub fn new(triggers: Vec<(String, Option<String>)>) -> Self { Self { triggers } }

    #[must_use]
    pub fn from_config(config: &ShellConfig) -> Self { Self::new(config.snippet_triggers()) }
}

impl CandidateProvider for SnippetProvider {
    fn label(&self) -> &'static str { "loading snippets" }

    fn token_type_aliases(&self) -> &'static [&'static str] { &["SnippetTrigger", "SnippetKey"] }

    fn collect(
        &self,
        query: &CompletionQuery,
        token_type: &str,
    ) -> miette::Result<Vec<CompletionCandidate>> {
        Ok(self
            .triggers
            .iter()
            .filter(|(trigger, _)| matches_prefix(trigger, &query.prefix))
            .map(|(trigger, what)| CompletionCandidate {
                value: trigger.clone(),
                token_type: token_type.to_string(),
                metadata: CandidateMetadata::SnippetTrigger {
                    label: trigger.clone(),
                    description: what.clone().unwrap_or_else(|| trigger.clone()),
                    snippet_name: what.clone(),
                },
            })
            .collect())
    }
}
