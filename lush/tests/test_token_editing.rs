// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use r3bl_lush::*;

fn registry() -> TypeRegistry {
    let config = ShellConfig::try_builtin().unwrap();
    TypeRegistry::try_from_config(&config).unwrap()
}

fn types_of(line: &TokenLine) -> Vec<(String, String)> {
    line.tokens
        .iter()
        .map(|it| (it.type_name.clone(), it.text()))
        .collect()
}

#[test]
fn test_builtin_config_has_shell_and_calc() {
    let registry = registry();
    let modes = registry.mode_names().collect::<Vec<_>>();
    assert_eq2!(modes, vec!["calc", "shell"]);

    // The catch all is always last.
    let shell = registry.try_table("shell").unwrap();
    let names = shell
        .valid_types_for("%$#@!")
        .into_iter()
        .map(|it| it.name.as_str())
        .collect::<Vec<_>>();
    assert_eq2!(names.last(), Some(&NAKED_STRING_TYPE));

    assert!(registry.try_table("vim").is_err());
}

#[test]
fn test_typing_keeps_text_and_positions_consistent() {
    let registry = registry();
    let types = registry.try_table("shell").unwrap();
    let typed = "ls -la  /tmp 0x1F";

    let mut line = TokenLine::default();
    for (count, ch) in typed.chars().enumerate() {
        assert!(insert_char(types, &mut line, count, ch));
        let expected = typed.chars().take(count + 1).collect::<String>();
        assert_eq2!(line.text(), expected);

        // Positions are contiguous.
        let mut x = 0;
        for (index, token) in line.tokens.iter().enumerate() {
            assert_eq2!(token.index, index);
            assert_eq2!(token.x, x);
            x += token.len_chars();
        }
    }

    // Deleting from the middle, one char at a time.
    assert_eq2!(delete_range(types, &mut line, 2, 8), 6);
    assert_eq2!(line.text(), "ls/tmp 0x1F");
    assert!(!delete_char(types, &mut line, 100));
}

#[test]
fn test_rotated_token_is_reclassified_after_an_edit() {
    let registry = registry();
    let calc = registry.try_table("calc").unwrap();

    let mut line = tokenize("12 + 3");
    assert!(rotate_type_at(calc, &mut line, 0));
    assert!(rotate_type_at(calc, &mut line, 4));
    assert_eq2!(
        types_of(&line),
        vec![
            ("Number".into(), "12".into()),
            (SPACE_TYPE.into(), " ".into()),
            ("Operator".into(), "+".into()),
            (SPACE_TYPE.into(), " ".into()),
            (NAKED_STRING_TYPE.into(), "3".into()),
        ]
    );

    // "12x" is no longer a number.
    assert!(insert_char(calc, &mut line, 2, 'x'));
    assert_eq2!(line.tokens[0].type_name, NAKED_STRING_TYPE);
    assert_eq2!(line.text(), "12x + 3");

    // And back.
    assert!(delete_char(calc, &mut line, 2));
    assert_eq2!(line.text(), "12 + 3");
}

#[test]
fn test_split_into_lines_then_submit() {
    let registry = registry();
    let types = registry.try_table("shell").unwrap();

    let mut first = tokenize("git  commit -m wip");
    let second = split_line_at(types, &mut first, 10);
    assert_eq2!(first.text(), "git  commi");
    assert_eq2!(second.text(), "t -m wip");

    let multi_line = MultiLine::new(vec![first, second, TokenLine::default()]);
    assert_eq2!(multi_line.text(), "git  commi\nt -m wip\n");
    assert!(should_submit_on_empty_last_line(&multi_line, 2));
    assert!(!should_submit_on_empty_last_line(&multi_line, 1));
    assert_eq2!(
        collect_argument_texts(&multi_line),
        vec!["git", "commi", "t", "-m", "wip"]
    );

    let json = multi_line.to_json().unwrap();
    assert_eq2!(MultiLine::try_from_json(&json).unwrap(), multi_line);
}

#[test]
fn test_multi_line_json_shape_errors() {
    assert!(matches!(
        MultiLine::try_from_json(r#"{"lines": []}"#),
        Err(MultiLineFormatError::NotAnArrayOfLines)
    ));
    assert!(matches!(
        MultiLine::try_from_json("[[], 42]"),
        Err(MultiLineFormatError::LineNotAnArray { line_index: 1 })
    ));
    assert!(matches!(
        MultiLine::try_from_json("[["),
        Err(MultiLineFormatError::Json(_))
    ));
}
