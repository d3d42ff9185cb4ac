// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The declarative shell configuration, one JSON document.
//!
//! ```json
//! {
//!   "modes": {
//!     "shell": {
//!       "Number": { "priority": 40, "validator": "number", "highlight": "yellow" },
//!       "NakedString": { "priority": -100, "validator": "naked_string" }
//!     }
//!   },
//!   "snippets": { "control": { "for": { "what": "for loop" } } },
//!   "completion": { "max_rows": 10, "overflow_threshold": 100 },
//!   "editor": { "default_mode": "shell", "double_space_window_ms": 300 }
//! }
//! ```
//!
//! This module only describes the *shape* of the document. Turning the per mode type
//! tables into something that can validate text is done by
//! [`crate::TypeRegistry::try_from_config`], and that's where structural errors (eg: a
//! regex that doesn't compile) are reported.

use std::{collections::{BTreeMap, HashSet},
          fmt::Formatter,
          fs,
          path::{Path, PathBuf}};

use serde::{Deserialize, Deserializer, Serialize, Serializer,
            de::{MapAccess, Visitor},
            ser::SerializeMap};

use crate::{CommonResult, DEBUG_CONFIG_MOD, try_get_config_file_path};

const DEFAULT_CONFIG_DOCUMENT: &str = include_str!("default_config.json");

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ShellConfigError {
    #[error("Could not read shell config file {path}")]
    #[diagnostic(
        code(r3bl_lush::config::read),
        help("Check that the file exists and is readable")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Shell config is not valid: {source}")]
    #[diagnostic(
        code(r3bl_lush::config::parse),
        help("The document must be JSON w/ a `modes` object of type tables")
    )]
    Parse {
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    pub modes: BTreeMap<String, ModeTypeSpecs>,
    #[serde(default)]
    pub snippets: BTreeMap<String, BTreeMap<String, SnippetSpec>>,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

/// The type table of one mode, in declaration order. Declaration order breaks ties
/// between types of equal priority, so this can't be a sorted map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeTypeSpecs(pub Vec<(String, TypeSpec)>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSpec {
    pub priority: i32,
    pub validator: ValidatorSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    #[serde(default = "secable_by_default")]
    pub secable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<Vec<String>>,
}

fn secable_by_default() -> bool { true }

/// Which predicate decides whether some text can be a token of a given type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorSpec {
    /// Any non empty text.
    NakedString,
    /// Only `' '` characters.
    Space,
    /// A numeric literal.
    Number,
    /// The whole text matches this pattern.
    Regex(String),
    /// The text is one of the type's `instances`.
    Instances,
    /// `$name`, `@name`, `%name`, `$*name`, ...
    Variable,
    /// A file w/ an execute bit that can be found on `PATH`.
    Executable,
    /// A file or folder that exists.
    ExistingPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetSpec {
    #[serde(default)]
    pub what: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Upper bound on grid rows, on top of the terminal height.
    pub max_rows: Option<usize>,
    /// More candidates than this need confirmation before they are shown.
    pub overflow_threshold: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_rows: Some(10),
            overflow_threshold: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub default_mode: String,
    pub double_space_window_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_mode: "shell".into(),
            double_space_window_ms: 300,
        }
    }
}

impl ShellConfig {
    /// # Errors
    ///
    /// Returns [`ShellConfigError::Parse`] if the document doesn't have the expected
    /// shape.
    pub fn try_from_json_str(document: &str) -> Result<Self, ShellConfigError> {
        serde_json::from_str(document).map_err(|source| ShellConfigError::Parse { source })
    }

    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed.
    pub fn try_from_path(path: &Path) -> Result<Self, ShellConfigError> {
        let document = fs::read_to_string(path).map_err(|source| ShellConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::try_from_json_str(&document)
    }

    /// The configuration that ships w/ the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded document is broken.
    pub fn try_builtin() -> Result<Self, ShellConfigError> {
        Self::try_from_json_str(DEFAULT_CONFIG_DOCUMENT)
    }

    /// Resolution order:
    /// 1. `explicit_path` if given (it must exist).
    /// 2. `lush.json` in the config folder, if it exists.
    /// 3. [`ShellConfig::try_builtin`].
    ///
    /// # Errors
    ///
    /// Any failure to read or parse an existing file is fatal.
    pub fn try_load(explicit_path: Option<&Path>) -> CommonResult<Self> {
        if let Some(path) = explicit_path {
            return Ok(Self::try_from_path(path)?);
        }

        let config_file_path = try_get_config_file_path()?;
        if config_file_path.exists() {
            DEBUG_CONFIG_MOD.then(|| {
                // % is Display, ? is Debug.
                tracing::debug!(
                    message = "Loading shell config",
                    path = %config_file_path.display()
                );
            });
            return Ok(Self::try_from_path(&config_file_path)?);
        }

        Ok(Self::try_builtin()?)
    }

    /// Snippet triggers across every bucket, w/ their descriptions.
    #[must_use]
    pub fn snippet_triggers(&self) -> Vec<(String, Option<String>)> {
        self.snippets
            .values()
            .flat_map(|bucket| {
                bucket
                    .iter()
                    .filter(|(trigger, _)| !trigger.is_empty())
                    .map(|(trigger, spec)| {
                        let what = spec
                            .what
                            .as_ref()
                            .filter(|it| !it.trim().is_empty())
                            .cloned();
                        (trigger.clone(), what)
                    })
            })
            .collect()
    }
}

impl<'de> Deserialize<'de> for ModeTypeSpecs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ModeTypeSpecsVisitor;

        impl<'de> Visitor<'de> for ModeTypeSpecsVisitor {
            type Value = ModeTypeSpecs;

            fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "a map of type name to type spec")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut seen = HashSet::new();
                let mut acc = vec![];
                while let Some((name, spec)) = map.next_entry::<String, TypeSpec>()? {
                    if !seen.insert(name.clone()) {
                        return Err(serde::de::Error::custom(format!(
                            "type `{name}` is declared more than once"
                        )));
                    }
                    acc.push((name, spec));
                }
                Ok(ModeTypeSpecs(acc))
            }
        }

        deserializer.deserialize_map(ModeTypeSpecsVisitor)
    }
}

impl Serialize for ModeTypeSpecs {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, spec) in &self.0 {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}
