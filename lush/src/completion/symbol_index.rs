// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::HashSet,
          fs,
          path::{Path, PathBuf},
          sync::Arc};

use nom::{IResult, Parser,
          bytes::complete::take_till1,
          character::complete::char,
          combinator::rest,
          sequence::terminated};

use crate::{CandidateMetadata, CandidateProvider, CompletionCandidate, CompletionQuery,
            MtimeCache, matches_prefix, mtime_of};

/// Name of the index file looked up from the cwd towards the root.
pub const TAGS_FILE_NAME: &str = "tags";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    /// As written in the index, usually relative to the index file.
    pub file: String,
    pub kind: Option<String>,
}

/// Declarations of one language, from an external indexer.
pub trait SymbolIndex: Send + Sync {
    /// Symbols visible from `cwd`. No index at all is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// The index exists but can't be read or parsed.
    fn symbols(&self, cwd: &Path) -> miette::Result<Arc<Vec<SymbolEntry>>>;
}

type ParsedTags = Result<Vec<SymbolEntry>, String>;

/// Reads a ctags `tags` file, the closest one above the cwd. Parsed files are cached
/// until they are modified, failures included.
#[derive(Debug, Default)]
pub struct CtagsSymbolIndex {
    cache: MtimeCache<ParsedTags>,
}

impl CtagsSymbolIndex {
    #[must_use]
    pub fn new() -> Self { Self::default() }
}

impl SymbolIndex for CtagsSymbolIndex {
    fn symbols(&self, cwd: &Path) -> miette::Result<Arc<Vec<SymbolEntry>>> {
        let Some(tags_path) = find_tags_file(cwd) else {
            return Ok(Arc::new(vec![]));
        };
        let key = tags_path.display().to_string();
        let parsed = self.cache.get_or_load(&key, mtime_of(&tags_path), || {
            let content = fs::read_to_string(&tags_path).map_err(|it| it.to_string())?;
            parse_tags(&content)
        });
        match parsed.as_ref() {
            Ok(symbols) => Ok(Arc::new(symbols.clone())),
            Err(message) => Err(miette::miette!("{key}: {message}")),
        }
    }
}

#[must_use]
pub fn find_tags_file(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .map(|it| it.join(TAGS_FILE_NAME))
        .find(|it| it.is_file())
}

/// `name<TAB>file<TAB>address;"<TAB>extension fields`. Lines starting w/ `!_` are
/// pseudo tags. A name seen twice keeps its first entry.
///
/// # Errors
///
/// A line w/out at least three fields.
pub fn parse_tags(content: &str) -> Result<Vec<SymbolEntry>, String> {
    let mut seen = HashSet::new();
    let mut acc = vec![];
    for (line_index, line) in content.lines().enumerate() {
        if line.is_empty() || line.starts_with("!_") {
            continue;
        }
        let Ok((_, (name, file, address))) = tag_line(line) else {
            return Err(format!("malformed tag on line {}", line_index + 1));
        };
        if !seen.insert(name) {
            continue;
        }
        acc.push(SymbolEntry {
            name: name.to_string(),
            file: file.to_string(),
            kind: extension_kind(address),
        });
    }
    Ok(acc)
}

fn tag_line(input: &str) -> IResult<&str, (&str, &str, &str)> {
    (
        terminated(take_till1(|c: char| c == '\t'), char('\t')),
        terminated(take_till1(|c: char| c == '\t'), char('\t')),
        rest,
    )
        .parse(input)
}

/// The kind from the extension fields after `;"`: `kind:function`, or a bare kind
/// letter.
fn extension_kind(address_and_fields: &str) -> Option<String> {
    let (_, fields) = address_and_fields.split_once(";\"")?;
    fields.split('\t').filter(|it| !it.is_empty()).find_map(|field| {
        match field.split_once(':') {
            Some(("kind", kind)) => Some(kind.to_string()),
            Some(_) => None,
            None => Some(kind_name(field).to_string()),
        }
    })
}

fn kind_name(letter: &str) -> &str {
    match letter {
        "c" => "class",
        "d" => "macro",
        "e" => "enumerator",
        "f" => "function",
        "g" => "enum",
        "i" => "interface",
        "m" => "member",
        "n" => "namespace",
        "s" => "struct",
        "t" => "typedef",
        "v" => "variable",
        other => other,
    }
}

/// Completion stage over a [`SymbolIndex`].
pub struct SymbolProvider {
    index: Arc<dyn SymbolIndex>,
}

impl SymbolProvider {
    #[must_use]
    pub fn new(index: Arc<dyn SymbolIndex>) -> Self { Self { index } }
}

impl std::fmt::Debug for SymbolProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolProvider").finish_non_exhaustive()
    }
}

impl CandidateProvider for SymbolProvider {
    fn label(&self) -> &'static str { "indexing symbols" }

    fn token_type_aliases(&self) -> &'static [&'static str] { &["Symbol", "ExternalSymbol"] }

    fn collect(
        &self,
        query: &CompletionQuery,
        token_type: &str,
    ) -> miette::Result<Vec<CompletionCandidate>> {
        let symbols = self.index.symbols(&query.cwd)?;
        Ok(symbols
            .iter()
            .filter(|it| matches_prefix(&it.name, &query.prefix))
            .map(|it| CompletionCandidate {
                value: it.name.clone(),
                token_type: token_type.to_string(),
                metadata: CandidateMetadata::ExternalSymbol {
                    label: it.name.clone(),
                    description: it.name.clone(),
                    symbol_kind: it.kind.clone(),
                    file: Some(it.file.clone()),
                },
            })
            .collect())
    }
}
