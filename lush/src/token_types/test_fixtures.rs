// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{HighlightSpec, NAKED_STRING_TYPE, SPACE_TYPE, TypeDescriptor, TypeTable,
            Validator};

fn shell_descriptors() -> Vec<TypeDescriptor> {
    let instances = ["echo", "cd", "jobs"].map(String::from).into();
    vec![
        TypeDescriptor::new("Prompt", 50, Validator::try_new_regex("[>$]").unwrap())
            .with_secable(false),
        TypeDescriptor::new("Number", 40, Validator::Number)
            .with_highlight(HighlightSpec::try_parse("yellow").unwrap()),
        TypeDescriptor::new("Builtin", 30, Validator::Instances(instances)),
        TypeDescriptor::new("Folder", 15, Validator::ExistingPath),
        TypeDescriptor::new(SPACE_TYPE, 0, Validator::Space),
        TypeDescriptor::new(NAKED_STRING_TYPE, -100, Validator::NakedString),
    ]
}

/// A small shell mode: `Prompt` (not secable), `Number`, `Builtin` (`echo`, `cd`,
/// `jobs`), `Folder`, `Space` and `NakedString`.
pub fn shell_type_table() -> TypeTable { TypeTable::new("shell", shell_descriptors()) }

/// [`shell_type_table`] plus a low priority `Name` type for identifiers, so that the
/// pieces of a split word keep a declared type.
pub fn identifier_type_table() -> TypeTable {
    let mut descriptors = shell_descriptors();
    descriptors.push(TypeDescriptor::new(
        "Name",
        5,
        Validator::try_new_regex("[a-zA-Z_][a-zA-Z0-9_]*").unwrap(),
    ));
    TypeTable::new("shell", descriptors)
}
