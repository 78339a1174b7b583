//! Integration tests for the utility layer.

use reflekt_less::util::{
    IdGenerator, RandomIds, SeededIds, argument_list, has_prefix, parse_keyword, prefix_ordered_keys,
    strip_quotes, to_camel_case, uuid,
};
use reflekt_less::{Color, Keyword};

#[test]
fn test_strip_quotes() {
    assert_eq!(strip_quotes("\"Avenir\""), "Avenir");
    assert_eq!(strip_quotes("'Avenir'"), "Avenir");
    assert_eq!(strip_quotes("Avenir"), "Avenir");
}

#[test]
fn test_has_prefix() {
    assert!(has_prefix("constraint-vfl", &["constraint", "layout"]));
    assert!(!has_prefix("color", &["constraint", "layout"]));
    assert!(!has_prefix("color", &[]));
}

#[test]
fn test_prefix_ordered_keys() {
    let keys = ["transition", "-webkit-transition", "color", "-moz-transition"];
    assert_eq!(
        prefix_ordered_keys(keys),
        ["-webkit-transition", "-moz-transition", "transition", "color"]
    );
}

#[test]
fn test_to_camel_case() {
    assert_eq!(to_camel_case("background-color"), "backgroundColor");
    assert_eq!(to_camel_case("z-index"), "zIndex");
    assert_eq!(to_camel_case("opacity"), "opacity");
}

#[test]
fn test_argument_list() {
    assert_eq!(
        argument_list("shadow(2px, 4px, rgba(0, 0, 0, 0.5))"),
        Some(vec!["2px".to_string(), "4px".to_string(), "rgba(0, 0, 0, 0.5)".to_string()])
    );
    assert_eq!(argument_list("12px"), None);
}

#[test]
fn test_parse_keyword() {
    assert_eq!(
        parse_keyword("transparent"),
        Keyword::Color {
            name: "transparent".to_string(),
            color: Color::TRANSPARENT,
        }
    );
    match parse_keyword("no") {
        Keyword::Boolean { value, .. } => assert!(!value),
        other => panic!("Expected boolean, got {other:?}"),
    }
}

#[test]
fn test_uuid_format() {
    let id = uuid();
    let groups: Vec<usize> = id.split('-').map(str::len).collect();
    assert_eq!(groups, [8, 4, 4, 4, 12]);
    assert!(id.chars().all(|c| c == '-' || c.is_ascii_hexdigit()));
    assert!(matches!(id.as_bytes()[19], b'8' | b'9' | b'a' | b'b'));
}

#[test]
fn test_generators() {
    let mut seeded = SeededIds::new(3);
    let mut again = SeededIds::new(3);
    let first: Vec<String> = (0..4).map(|_| seeded.next_id()).collect();
    let second: Vec<String> = (0..4).map(|_| again.next_id()).collect();
    assert_eq!(first, second);

    let mut random = RandomIds;
    let generator: &mut dyn IdGenerator = &mut random;
    assert_ne!(generator.next_id(), generator.next_id());
}
