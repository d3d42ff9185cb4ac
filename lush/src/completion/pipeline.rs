// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{ops::ControlFlow,
          sync::Arc};

use crate::{BuiltinProvider, CandidateProvider, CompletionCandidate, CompletionQuery,
            DirectoryProvider, PathExecutableProvider, ShellConfig, SnippetProvider,
            SymbolIndex, SymbolProvider, TypeTable, dedupe_candidates, sort_candidates};

pub const DEBUG_COMPLETION_MOD: bool = false;

/// Label of the last stage, merging and sorting.
pub const FINAL_STAGE_LABEL: &str = "finalizing results";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageProgress {
    /// 1 based.
    pub index: usize,
    pub total: usize,
    pub label: &'static str,
}

/// Ordered provider stages. The result is the union of every stage, deduplicated by
/// value and sorted.
pub struct CompletionPipeline {
    stages: Vec<Arc<dyn CandidateProvider>>,
}

impl std::fmt::Debug for CompletionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionPipeline")
            .field(
                "stages",
                &self.stages.iter().map(|it| it.label()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl CompletionPipeline {
    #[must_use]
    pub fn new(stages: Vec<Arc<dyn CandidateProvider>>) -> Self { Self { stages } }

    /// Folders, builtins, snippets, `PATH` executables, symbols.
    #[must_use]
    pub fn with_default_stages(
        config: &ShellConfig,
        builtins: BuiltinProvider,
        symbol_index: Arc<dyn SymbolIndex>,
    ) -> Self {
        Self::new(vec![
            Arc::new(DirectoryProvider),
            Arc::new(builtins),
            Arc::new(SnippetProvider::from_config(config)),
            Arc::new(PathExecutableProvider::new()),
            Arc::new(SymbolProvider::new(symbol_index)),
        ])
    }

    /// Provider stages plus the final one.
    #[must_use]
    pub fn total_stages(&self) -> usize { self.stages.len() + 1 }

    /// Runs every stage in order, reporting each one to `on_stage` before it starts.
    /// `on_stage` can stop the run by returning [`ControlFlow::Break`], then `None` is
    /// returned.
    ///
    /// A stage whose token types aren't declared in `types` yields nothing. A stage
    /// that fails is logged and skipped.
    pub fn collect(
        &self,
        query: &CompletionQuery,
        types: &TypeTable,
        mut on_stage: impl FnMut(StageProgress) -> ControlFlow<()>,
    ) -> Option<Vec<CompletionCandidate>> {
        let total = self.total_stages();
        let mut merged = vec![];

        for (index, stage) in self.stages.iter().enumerate() {
            let progress = StageProgress {
                index: index + 1,
                total,
                label: stage.label(),
            };
            if on_stage(progress).is_break() {
                return None;
            }

            let Some(token_type) = types.resolve_type_name(stage.token_type_aliases()) else {
                continue;
            };
            match stage.collect(query, token_type) {
                Ok(candidates) => {
                    DEBUG_COMPLETION_MOD.then(|| {
                        // % is Display, ? is Debug.
                        tracing::debug!(
                            message = "Completion stage done",
                            stage = %stage.label(),
                            count = %candidates.len()
                        );
                    });
                    merged.extend(candidates);
                }
                Err(report) => {
                    // % is Display, ? is Debug.
                    tracing::warn!(
                        message = "Completion stage failed",
                        stage = %stage.label(),
                        error = ?report
                    );
                }
            }
        }

        let progress = StageProgress {
            index: total,
            total,
            label: FINAL_STAGE_LABEL,
        };
        if on_stage(progress).is_break() {
            return None;
        }

        let mut acc = dedupe_candidates(merged);
        sort_candidates(&mut acc);
        Some(acc)
    }
}

#[cfg(test)]
pub mod test_providers {
    use super::*;
    use crate::completion::candidate::test_candidates::{builtin, command};

    /// Returns fixed candidates, or fails.
    pub struct FixedProvider {
        pub label: &'static str,
        pub aliases: &'static [&'static str],
        pub candidates: Option<Vec<CompletionCandidate>>,
    }

    impl CandidateProvider for FixedProvider {
        fn label(&self) -> &'static str { self.label }

        fn token_type_aliases(&self) -> &'static [&'static str] { self.aliases }

        fn collect(
            &self,
            query: &CompletionQuery,
            _token_type: &str,
        ) -> miette::Result<Vec<CompletionCandidate>> {
            match &self.candidates {
                Some(it) => Ok(it
                    .iter()
                    .filter(|it| crate::matches_prefix(&it.value, &query.prefix))
                    .cloned()
                    .collect()),
                None => Err(miette::miette!("{} is broken", self.label)),
            }
        }
    }

    /// Builtins `cd` and `echo`, a failing stage, commands `cd`, `Cat` and `cargo`.
    pub fn sample_pipeline() -> CompletionPipeline {
        CompletionPipeline::new(vec![
            Arc::new(FixedProvider {
                label: "loading builtins",
                aliases: &["Builtin"],
                candidates: Some(vec![builtin("cd"), builtin("echo")]),
            }),
            Arc::new(FixedProvider {
                label: "broken",
                aliases: &["Builtin"],
                candidates: None,
            }),
            Arc::new(FixedProvider {
                label: "finding commands",
                aliases: &["Command", "Builtin"],
                candidates: Some(vec![command("cd"), command("Cat"), command("cargo")]),
            }),
        ])
    }
}

#[cfg(test)]
mod tests_pipeline {
    use super::{test_providers::sample_pipeline, *};
    use crate::{CandidateKind, assert_eq2, token_types::test_fixtures::shell_type_table};

    #[test]
    fn test_merge_dedupe_sort_and_progress() {
        let types = shell_type_table();
        let mut progress = vec![];
        let it = sample_pipeline()
            .collect(&CompletionQuery::new("c", "/"), &types, |it| {
                progress.push((it.index, it.total, it.label));
                ControlFlow::Continue(())
            })
            .unwrap();

        let values: Vec<(&str, CandidateKind)> =
            it.iter().map(|it| (it.value.as_str(), it.kind())).collect();
        assert_eq2!(
            values,
            vec![
                ("cargo", CandidateKind::Command),
                ("Cat", CandidateKind::Command),
                ("cd", CandidateKind::Builtin),
            ]
        );
        assert_eq2!(
            progress,
            vec![
                (1, 4, "loading builtins"),
                (2, 4, "broken"),
                (3, 4, "finding commands"),
                (4, 4, FINAL_STAGE_LABEL),
            ]
        );
    }

    #[test]
    fn test_break_stops_the_run() {
        let types = shell_type_table();
        let mut calls = 0;
        let it = sample_pipeline().collect(&CompletionQuery::new("", "/"), &types, |_| {
            calls += 1;
            if calls == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq2!(it, None);
        assert_eq2!(calls, 2);
    }

    #[test]
    fn test_undeclared_token_type_skips_stage() {
        let types = crate::TypeTable::new("bare", vec![]);
        let it = sample_pipeline()
            .collect(&CompletionQuery::new("", "/"), &types, |_| ControlFlow::Continue(()))
            .unwrap();
        assert!(it.is_empty());
    }
}
