// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{cmp::Reverse,
          collections::{BTreeMap, BTreeSet}};

use crate::{HighlightSpec, ModeTypeSpecs, ShellConfig, TypeRegistryError, TypeSpec,
            Validator, ValidatorSpec};

pub const DEBUG_TOKEN_TYPES_MOD: bool = false;

/// Type of every whitespace run produced by the tokenizer.
pub const SPACE_TYPE: &str = "Space";

/// Default type of every non whitespace run produced by the tokenizer. It is also the
/// catch all type that accepts any text.
pub const NAKED_STRING_TYPE: &str = "NakedString";

/// Priority used when the catch all type isn't declared explicitly.
pub const IMPLICIT_NAKED_STRING_PRIORITY: i32 = i32::MIN;

#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: String,
    pub priority: i32,
    pub validator: Validator,
    pub highlight: Option<HighlightSpec>,
    /// `false` means an edit may never split a token of this type.
    pub secable: bool,
    pub instances: Option<BTreeSet<String>>,
}

impl TypeDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, priority: i32, validator: Validator) -> Self {
        Self {
            name: name.into(),
            priority,
            validator,
            highlight: None,
            secable: true,
            instances: None,
        }
    }

    #[must_use]
    pub fn with_secable(mut self, secable: bool) -> Self {
        self.secable = secable;
        self
    }

    #[must_use]
    pub fn with_highlight(mut self, highlight: HighlightSpec) -> Self {
        self.highlight = Some(highlight);
        self
    }

    #[must_use]
    pub fn accepts(&self, text: &str) -> bool { self.validator.accepts(text) }

    fn implicit_space() -> Self { Self::new(SPACE_TYPE, 0, Validator::Space) }

    fn implicit_naked_string() -> Self {
        Self::new(
            NAKED_STRING_TYPE,
            IMPLICIT_NAKED_STRING_PRIORITY,
            Validator::NakedString,
        )
    }

    fn try_from_spec(
        mode: &str,
        type_name: &str,
        spec: &TypeSpec,
    ) -> Result<Self, TypeRegistryError> {
        let instances: Option<BTreeSet<String>> =
            spec.instances.as_ref().map(|it| it.iter().cloned().collect());

        let validator = match &spec.validator {
            ValidatorSpec::NakedString => Validator::NakedString,
            ValidatorSpec::Space => Validator::Space,
            ValidatorSpec::Number => Validator::Number,
            ValidatorSpec::Variable => Validator::Variable,
            ValidatorSpec::Executable => Validator::Executable,
            ValidatorSpec::ExistingPath => Validator::ExistingPath,
            ValidatorSpec::Regex(pattern) => Validator::try_new_regex(pattern)
                .map_err(|source| TypeRegistryError::InvalidRegex {
                    mode: mode.to_string(),
                    type_name: type_name.to_string(),
                    source,
                })?,
            ValidatorSpec::Instances => match &instances {
                Some(it) if !it.is_empty() => Validator::Instances(it.clone()),
                _ => {
                    return Err(TypeRegistryError::MissingInstances {
                        mode: mode.to_string(),
                        type_name: type_name.to_string(),
                    });
                }
            },
        };

        let expected_builtin = match type_name {
            SPACE_TYPE => Some(("space", matches!(validator, Validator::Space))),
            NAKED_STRING_TYPE => {
                Some(("naked_string", matches!(validator, Validator::NakedString)))
            }
            _ => None,
        };
        if let Some((expected, false)) = expected_builtin {
            return Err(TypeRegistryError::MisdeclaredBuiltinType {
                mode: mode.to_string(),
                type_name: type_name.to_string(),
                expected,
            });
        }

        // An unknown highlight step only costs the color, not the type.
        let highlight = spec.highlight.as_deref().and_then(|it| {
            HighlightSpec::try_parse(it)
                .inspect_err(|step| {
                    // % is Display, ? is Debug.
                    tracing::warn!(
                        message = "Ignoring highlight w/ unknown step",
                        mode = %mode,
                        type_name = %type_name,
                        step = %step
                    );
                })
                .ok()
        });

        Ok(Self {
            name: type_name.to_string(),
            priority: spec.priority,
            validator,
            highlight,
            secable: spec.secable,
            instances,
        })
    }
}

/// The type descriptors of one editing mode, in declaration order.
///
/// A table always contains [`SPACE_TYPE`] and [`NAKED_STRING_TYPE`]. When they aren't
/// declared they are added w/ default settings, so [`TypeTable::valid_types_for`] is
/// never empty for non empty text.
#[derive(Debug, Clone)]
pub struct TypeTable {
    mode: String,
    descriptors: Vec<TypeDescriptor>,
}

impl TypeTable {
    #[must_use]
    pub fn new(mode: impl Into<String>, descriptors: Vec<TypeDescriptor>) -> Self {
        let mut it = Self {
            mode: mode.into(),
            descriptors,
        };
        if !it.is_declared(SPACE_TYPE) {
            it.descriptors.push(TypeDescriptor::implicit_space());
        }
        if !it.is_declared(NAKED_STRING_TYPE) {
            it.descriptors.push(TypeDescriptor::implicit_naked_string());
        }
        it
    }

    /// # Errors
    ///
    /// Returns an error if the table is empty, or a type can't be compiled.
    pub fn try_from_specs(
        mode: &str,
        specs: &ModeTypeSpecs,
    ) -> Result<Self, TypeRegistryError> {
        if specs.0.is_empty() {
            return Err(TypeRegistryError::EmptyMode {
                mode: mode.to_string(),
            });
        }
        let descriptors = specs
            .0
            .iter()
            .map(|(type_name, spec)| TypeDescriptor::try_from_spec(mode, type_name, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(mode, descriptors))
    }

    #[must_use]
    pub fn mode(&self) -> &str { &self.mode }

    #[must_use]
    pub fn descriptors(&self) -> &[TypeDescriptor] { &self.descriptors }

    #[must_use]
    pub fn descriptor(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.descriptors.iter().find(|it| it.name == type_name)
    }

    #[must_use]
    pub fn is_declared(&self, type_name: &str) -> bool {
        self.descriptor(type_name).is_some()
    }

    /// Every descriptor that accepts `text`, highest priority first. Ties keep
    /// declaration order. Empty text has no valid types.
    #[must_use]
    pub fn valid_types_for(&self, text: &str) -> Vec<&TypeDescriptor> {
        let mut acc: Vec<&TypeDescriptor> =
            self.descriptors.iter().filter(|it| it.accepts(text)).collect();
        acc.sort_by_key(|it| Reverse(it.priority));
        DEBUG_TOKEN_TYPES_MOD.then(|| {
            // % is Display, ? is Debug.
            tracing::debug!(
                message = "valid_types_for",
                text = ?text,
                types = ?acc.iter().map(|it| it.name.as_str()).collect::<Vec<_>>()
            );
        });
        acc
    }

    /// Highest priority type that accepts `text`.
    #[must_use]
    pub fn best_type_for(&self, text: &str) -> Option<&str> {
        self.valid_types_for(text).first().map(|it| it.name.as_str())
    }

    /// `None` if the type isn't declared.
    #[must_use]
    pub fn accepts(&self, type_name: &str, text: &str) -> Option<bool> {
        self.descriptor(type_name).map(|it| it.accepts(text))
    }

    #[must_use]
    pub fn highlighter_for(&self, type_name: &str) -> Option<&HighlightSpec> {
        self.descriptor(type_name)?.highlight.as_ref()
    }

    /// Undeclared types are secable.
    #[must_use]
    pub fn is_secable(&self, type_name: &str) -> bool {
        self.descriptor(type_name).is_none_or(|it| it.secable)
    }

    /// `text` painted w/ the highlight of `type_name`, or unchanged.
    #[must_use]
    pub fn paint(&self, type_name: &str, text: &str) -> String {
        match self.highlighter_for(type_name) {
            Some(it) => it.apply(text),
            None => text.to_string(),
        }
    }

    /// First of `aliases` that is declared in this table.
    #[must_use]
    pub fn resolve_type_name(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .find_map(|alias| self.descriptor(alias).map(|it| it.name.as_str()))
    }
}

/// One [`TypeTable`] per editing mode. Loaded once at startup and then shared
/// read only.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    modes: BTreeMap<String, TypeTable>,
}

impl TypeRegistry {
    /// # Errors
    ///
    /// Any structural problem is reported, see [`TypeRegistryError`].
    pub fn try_from_config(config: &ShellConfig) -> Result<Self, TypeRegistryError> {
        if config.modes.is_empty() {
            return Err(TypeRegistryError::NoModes);
        }
        let modes = config
            .modes
            .iter()
            .map(|(mode, specs)| {
                TypeTable::try_from_specs(mode, specs).map(|it| (mode.clone(), it))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        // % is Display, ? is Debug.
        tracing::info!(
            message = "Type registry loaded",
            modes = ?modes.keys().collect::<Vec<_>>()
        );

        Ok(Self { modes })
    }

    #[must_use]
    pub fn from_tables(tables: impl IntoIterator<Item = TypeTable>) -> Self {
        Self {
            modes: tables
                .into_iter()
                .map(|it| (it.mode().to_string(), it))
                .collect(),
        }
    }

    #[must_use]
    pub fn table(&self, mode: &str) -> Option<&TypeTable> { self.modes.get(mode) }

    /// # Errors
    ///
    /// Returns [`TypeRegistryError::UnknownMode`] if `mode` isn't declared.
    pub fn try_table(&self, mode: &str) -> Result<&TypeTable, TypeRegistryError> {
        self.table(mode).ok_or_else(|| TypeRegistryError::UnknownMode {
            mode: mode.to_string(),
        })
    }

    pub fn mode_names(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TypeTable> { self.modes.values() }
}

#[cfg(test)]
mod tests_type_registry {
    use super::*;
    use crate::{assert_eq2, token_types::test_fixtures::shell_type_table};

    fn names<'a>(it: &[&'a TypeDescriptor]) -> Vec<&'a str> {
        it.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_valid_types_sorted_by_priority() {
        let table = shell_type_table();
        assert_eq2!(
            names(&table.valid_types_for("42")),
            vec!["Number", NAKED_STRING_TYPE]
        );
        assert_eq2!(
            names(&table.valid_types_for("echo")),
            vec!["Builtin", NAKED_STRING_TYPE]
        );
        assert_eq2!(names(&table.valid_types_for("  ")), vec![SPACE_TYPE, NAKED_STRING_TYPE]);
        assert!(table.valid_types_for("").is_empty());
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let table = TypeTable::new(
            "m",
            vec![
                TypeDescriptor::new("B", 5, Validator::Number),
                TypeDescriptor::new("A", 5, Validator::Number),
                TypeDescriptor::new("C", 9, Validator::Number),
            ],
        );
        assert_eq2!(
            names(&table.valid_types_for("1")),
            vec!["C", "B", "A", NAKED_STRING_TYPE]
        );
    }

    #[test]
    fn test_implicit_builtin_types_are_added() {
        let table = TypeTable::new("m", vec![]);
        assert!(table.is_declared(SPACE_TYPE));
        assert!(table.is_declared(NAKED_STRING_TYPE));
        assert_eq2!(table.best_type_for("??"), Some(NAKED_STRING_TYPE));
    }

    #[test]
    fn test_secable_and_highlight_lookup() {
        let table = shell_type_table();
        assert!(!table.is_secable("Prompt"));
        assert!(table.is_secable("Number"));
        assert!(table.is_secable("Undeclared"));
        assert!(table.highlighter_for("Number").is_some());
        assert!(table.highlighter_for(SPACE_TYPE).is_none());
        assert_eq2!(table.paint(SPACE_TYPE, " "), " ");
    }

    #[test]
    fn test_resolve_type_name() {
        let table = shell_type_table();
        assert_eq2!(table.resolve_type_name(&["ShBuiltin", "Builtin"]), Some("Builtin"));
        assert_eq2!(table.resolve_type_name(&["Nope"]), None);
    }

    #[test]
    fn test_registry_from_builtin_config() {
        let config = ShellConfig::try_builtin().unwrap();
        let registry = TypeRegistry::try_from_config(&config).unwrap();
        assert_eq2!(registry.mode_names().collect::<Vec<_>>(), vec!["calc", "shell"]);
        let shell = registry.try_table("shell").unwrap();
        assert_eq2!(shell.best_type_for("0x1F"), Some("Number"));
        assert!(matches!(
            registry.try_table("nope"),
            Err(TypeRegistryError::UnknownMode { .. })
        ));
    }

    #[test]
    fn test_structural_errors() {
        let parse = |doc: &str| {
            TypeRegistry::try_from_config(&ShellConfig::try_from_json_str(doc).unwrap())
        };

        assert!(matches!(parse(r#"{ "modes": {} }"#), Err(TypeRegistryError::NoModes)));
        assert!(matches!(
            parse(r#"{ "modes": { "m": {} } }"#),
            Err(TypeRegistryError::EmptyMode { .. })
        ));
        assert!(matches!(
            parse(r#"{ "modes": { "m": { "X": { "priority": 1, "validator": { "regex": "(" } } } } }"#),
            Err(TypeRegistryError::InvalidRegex { .. })
        ));
        assert!(matches!(
            parse(r#"{ "modes": { "m": { "X": { "priority": 1, "validator": "instances" } } } }"#),
            Err(TypeRegistryError::MissingInstances { .. })
        ));
        assert!(matches!(
            parse(r#"{ "modes": { "m": { "Space": { "priority": 1, "validator": "number" } } } }"#),
            Err(TypeRegistryError::MisdeclaredBuiltinType { .. })
        ));
    }

    #[test]
    fn test_bad_highlight_only_drops_the_color() {
        let config = ShellConfig::try_from_json_str(
            r#"{ "modes": { "m": { "X": { "priority": 1, "validator": "number", "highlight": "sparkly" } } } }"#,
        )
        .unwrap();
        let registry = TypeRegistry::try_from_config(&config).unwrap();
        let table = registry.table("m").unwrap();
        assert!(table.is_declared("X"));
        assert!(table.highlighter_for("X").is_none());
    }
}
