use mdtext::align::TableStyle;
use mdtext::config::{ConfigFlags, load_config_flags, parse_flag_tokens};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".mdtextrc");
    let content = r#"
# comment
--no-color

--table-style ascii

--indent1="> " --indent2="> "
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert_eq!(flags.color, Some(false));
    assert_eq!(flags.table_style, Some(TableStyle::Ascii));
    assert_eq!(flags.indent1.as_deref(), Some("> "));
    assert_eq!(flags.indent2.as_deref(), Some("> "));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".mdtextrc");
    let content = "--width 60\n--table-style simple\n--header-prefix ##\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "mdtext".to_string(),
        "--table-style".to_string(),
        "unicode".to_string(),
        "--no-metadata".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert_eq!(effective.width, Some(60), "file flags should remain in effect");
    assert!(effective.no_metadata, "cli flags should be applied");
    assert_eq!(
        effective.table_style,
        Some(TableStyle::Unicode),
        "cli should override table style"
    );
    assert_eq!(
        effective.header_prefix.as_deref(),
        Some("##"),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "mdtext".to_string(),
        "--width=-8".to_string(),
        "--header-suffix=<<".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.width, Some(-8));
    assert_eq!(flags.header_suffix.as_deref(), Some("<<"));
}

#[test]
fn test_config_union_merges_switches() {
    let file = ConfigFlags {
        no_highlight: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        no_metadata: true,
        color: Some(true),
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.no_highlight);
    assert!(merged.no_metadata);
    assert_eq!(merged.color, Some(true));
}

#[test]
fn test_flags_drive_rendering() {
    let flags = parse_flag_tokens(&[
        "--width".to_string(),
        "30".to_string(),
        "--header-prefix=".to_string(),
        "--header-suffix=".to_string(),
    ]);
    let options = flags.to_options(false);
    let (_, body) = mdtext::markdown_to_text("# Title\n\ntext", &options);
    assert_eq!(body, "Title\n\n    text\n");
}
