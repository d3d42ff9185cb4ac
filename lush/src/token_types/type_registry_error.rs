// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Structural problems in the type tables. The shell can't run w/out type definitions,
/// so every variant is fatal at startup.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TypeRegistryError {
    #[error("No editing modes are declared")]
    #[diagnostic(
        code(r3bl_lush::token_types::no_modes),
        help("Add at least one mode under `modes` in the shell config")
    )]
    NoModes,

    #[error("Mode `{mode}` has no token types")]
    #[diagnostic(code(r3bl_lush::token_types::empty_mode))]
    EmptyMode { mode: String },

    #[error("Type `{type_name}` in mode `{mode}` has an invalid regex")]
    #[diagnostic(
        code(r3bl_lush::token_types::invalid_regex),
        help("The pattern is anchored for you, don't add `^` or `$`")
    )]
    InvalidRegex {
        mode: String,
        type_name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Type `{type_name}` in mode `{mode}` uses the `instances` validator w/out instances")]
    #[diagnostic(code(r3bl_lush::token_types::missing_instances))]
    MissingInstances { mode: String, type_name: String },

    #[error("Type `{type_name}` in mode `{mode}` must use the `{expected}` validator")]
    #[diagnostic(
        code(r3bl_lush::token_types::misdeclared_builtin_type),
        help("`Space` and `NakedString` are used by the tokenizer and can't be redefined")
    )]
    MisdeclaredBuiltinType {
        mode: String,
        type_name: String,
        expected: &'static str,
    },

    #[error("Mode `{mode}` is not declared")]
    #[diagnostic(code(r3bl_lush::token_types::unknown_mode))]
    UnknownMode { mode: String },
}
