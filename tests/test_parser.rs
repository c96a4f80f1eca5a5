//! Tests for `autopad::parser` - line classification, the line iterator,
//! block grouping, and database loading.

use std::io::Write;
use tempfile::NamedTempFile;

use autopad::parser::{
    BlockItem, Keyword, LineKind, ProfileDatabase, ProfileLines, classify_line, strip_space,
};

// -- Helpers --------------------------------------------------

fn kinds(text: &str) -> Vec<LineKind<'_>> {
    ProfileLines::new(text).map(|l| l.kind).collect()
}

// -- strip_space ----------------------------------------------

#[test]
fn test_strip_space_only_strips_ascii_blanks() {
    assert_eq!(strip_space(" \t\r\nPad \r\n"), "Pad");
    assert_eq!(strip_space("\x0bPad"), "\x0bPad");
    assert_eq!(strip_space(""), "");
}

// -- classify_line --------------------------------------------

#[test]
fn test_blank_lines() {
    assert_eq!(classify_line(""), LineKind::Blank);
    assert_eq!(classify_line("  \t\r"), LineKind::Blank);
}

#[test]
fn test_comment_lines() {
    assert_eq!(classify_line("; comment"), LineKind::Comment);
    assert_eq!(classify_line("   # comment"), LineKind::Comment);
    assert_eq!(classify_line("#[Pad]"), LineKind::Comment);
}

#[test]
fn test_section_header_is_stripped() {
    assert_eq!(classify_line("[ Pad ]"), LineKind::SectionHeader("Pad"));
    assert_eq!(
        classify_line("  [Linux: Logitech Gamepad]\r"),
        LineKind::SectionHeader("Linux: Logitech Gamepad")
    );
}

#[test]
fn test_empty_section_header() {
    assert_eq!(classify_line("[]"), LineKind::SectionHeader(""));
    assert_eq!(classify_line("[   ]"), LineKind::SectionHeader(""));
}

#[test]
fn test_header_wins_over_parameter() {
    assert_eq!(classify_line("[a = b]"), LineKind::SectionHeader("a = b"));
}

#[test]
fn test_lone_bracket_is_invalid() {
    assert_eq!(classify_line("["), LineKind::Invalid("["));
    assert_eq!(classify_line("[Pad"), LineKind::Invalid("[Pad"));
}

#[test]
fn test_parameter_splits_at_first_equals() {
    assert_eq!(
        classify_line("  X Axis = axis(0-,0+) = x "),
        LineKind::Parameter {
            key: "X Axis",
            value: "axis(0-,0+) = x"
        }
    );
}

#[test]
fn test_parameter_with_empty_parts() {
    assert_eq!(
        classify_line("="),
        LineKind::Parameter { key: "", value: "" }
    );
    assert_eq!(
        classify_line("mouse ="),
        LineKind::Parameter {
            key: "mouse",
            value: ""
        }
    );
}

#[test]
fn test_parameter_wins_over_keyword() {
    assert_eq!(
        classify_line("Start = button(7):"),
        LineKind::Parameter {
            key: "Start",
            value: "button(7):"
        }
    );
}

#[test]
fn test_next_controller_keyword() {
    assert_eq!(
        classify_line("  __NextController:  "),
        LineKind::Keyword(Keyword::NextController)
    );
}

#[test]
fn test_keyword_is_case_sensitive() {
    assert_eq!(
        classify_line("__nextcontroller:"),
        LineKind::UnknownKeyword("__nextcontroller:")
    );
    assert_eq!(
        classify_line("__Rumble:"),
        LineKind::UnknownKeyword("__Rumble:")
    );
}

#[test]
fn test_invalid_line() {
    assert_eq!(classify_line("just words"), LineKind::Invalid("just words"));
}

#[test]
fn test_keyword_display_round_trips() {
    assert_eq!(Keyword::NextController.to_string(), "__NextController:");
    assert_eq!(
        "__NextController:".parse::<Keyword>().ok(),
        Some(Keyword::NextController)
    );
}

// -- ProfileLines ---------------------------------------------

#[test]
fn test_line_numbers_count_every_line() {
    let numbers: Vec<usize> = ProfileLines::new("a = 1\n\n; c\n[Pad]")
        .map(|l| l.number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[test]
fn test_missing_trailing_newline() {
    assert_eq!(
        kinds("[Pad]\nplugged = True"),
        vec![
            LineKind::SectionHeader("Pad"),
            LineKind::Parameter {
                key: "plugged",
                value: "True"
            },
        ]
    );
}

#[test]
fn test_trailing_newline_adds_no_line() {
    assert_eq!(kinds("[Pad]\n").len(), 1);
    assert!(kinds("").is_empty());
}

#[test]
fn test_crlf_line_endings() {
    assert_eq!(
        kinds("[Pad]\r\nA Button = button(0)\r\n"),
        vec![
            LineKind::SectionHeader("Pad"),
            LineKind::Parameter {
                key: "A Button",
                value: "button(0)"
            },
        ]
    );
}

#[test]
fn test_lines_are_restartable() {
    let db = ProfileDatabase::from_text("[Pad]\na = 1\n__NextController:\n");
    let first: Vec<_> = db.lines().collect();
    let second: Vec<_> = db.lines().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_non_ascii_text() {
    assert_eq!(
        kinds("[Manette Sans Fil Ñ]\nnom = é"),
        vec![
            LineKind::SectionHeader("Manette Sans Fil Ñ"),
            LineKind::Parameter {
                key: "nom",
                value: "é"
            },
        ]
    );
}

// -- Blocks ---------------------------------------------------

#[test]
fn test_blocks_group_entries_and_keywords() {
    let db = ProfileDatabase::from_text(
        "; leading comment\n\
         orphan = 1\n\
         [Pad One]\n\
         plugged = True\n\
         __NextController:\n\
         device = 1\n\
         bogus line\n\
         [Pad Two]\n\
         [Pad Three]\n\
         mouse = False\n",
    );
    let blocks = db.blocks();
    assert_eq!(blocks.len(), 3);

    assert_eq!(blocks[0].header, "Pad One");
    assert_eq!(
        blocks[0].items,
        vec![
            BlockItem::Entry {
                key: "plugged".into(),
                value: "True".into()
            },
            BlockItem::Keyword(Keyword::NextController),
            BlockItem::Entry {
                key: "device".into(),
                value: "1".into()
            },
        ]
    );
    assert_eq!(
        blocks[0].entries().collect::<Vec<_>>(),
        vec![("plugged", "True"), ("device", "1")]
    );
    assert_eq!(
        blocks[0].keywords().collect::<Vec<_>>(),
        vec![Keyword::NextController]
    );

    assert!(blocks[1].is_empty());
    assert_eq!(blocks[2].entries().count(), 1);
}

#[test]
fn test_blocks_of_headerless_text() {
    let db = ProfileDatabase::from_text("a = 1\nb = 2\n");
    assert!(db.blocks().is_empty());
}

// -- Loading --------------------------------------------------

#[test]
fn test_load_from_file() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(b"[Pad]\nplugged = True\n").unwrap();
    f.flush().unwrap();
    let db = ProfileDatabase::load(f.path()).unwrap();
    assert_eq!(db.text(), "[Pad]\nplugged = True\n");
    assert_eq!(db.blocks().len(), 1);
}

#[test]
fn test_load_replaces_invalid_utf8() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(b"[Pad \xff]\na = 1\n").unwrap();
    f.flush().unwrap();
    let db = ProfileDatabase::load(f.path()).unwrap();
    assert_eq!(db.blocks()[0].header, "Pad \u{fffd}");
}

#[test]
fn test_load_missing_file() {
    let msg = ProfileDatabase::load(std::path::Path::new("/no/such/InputAutoCfg.ini"))
        .unwrap_err()
        .to_string();
    assert!(msg.contains("Failed to read profile database"));
    assert!(msg.contains("/no/such/InputAutoCfg.ini"));
}
