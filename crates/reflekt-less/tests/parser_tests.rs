//! Integration tests for the LESS parser and the resolved stylesheet.

use reflekt_less::{
    BlockKind, Color, Error, FallbackReason, Keyword, Number, ParseError, ParseOptions, ParseWarning, Parsed,
    RandomIds, SeededIds, Stylesheet, Token, Unit, Value, Warning, parse_bytes, parse_with,
};
use std::collections::HashSet;
use std::thread;

fn quiet() -> ParseOptions {
    ParseOptions::default().with_report_warnings(false)
}

/// Helper to parse with deterministic ids and no stderr output
fn parse(source: &str) -> Parsed {
    parse_with(source, &quiet(), &mut SeededIds::new(42)).unwrap()
}

fn stylesheet(source: &str) -> Stylesheet {
    let parsed = parse(source);
    assert!(parsed.warnings.is_empty(), "unexpected warnings: {:?}", parsed.warnings);
    parsed.stylesheet
}

fn px(value: f64) -> Value {
    Value::Number(Number::new(value, Unit::Px))
}

#[test]
fn test_simple_rule() {
    let sheet = stylesheet(".btn { color: #FF0000; font-size: 12px; }");
    let btn = sheet.get(".btn").unwrap();
    assert_eq!(btn.get("color"), Some(&Value::Color(Color::rgb(255, 0, 0))));
    assert_eq!(btn.get("fontSize"), Some(&px(12.0)));
    assert_eq!(btn.declarations[1].property, "font-size");
    match &btn.kind {
        BlockKind::Rule { selectors } => assert_eq!(selectors, &[".btn"]),
        other => panic!("Expected rule block, got {other:?}"),
    }
}

#[test]
fn test_media_block_with_nested_rule() {
    let sheet = stylesheet("@media screen { .a { width: 50%; } }");
    let media = sheet.get("@media screen").unwrap();
    match &media.kind {
        BlockKind::AtRule { keyword, prelude } => {
            assert_eq!(keyword, "media");
            assert_eq!(prelude, "screen");
        }
        other => panic!("Expected at-rule block, got {other:?}"),
    }
    let inner = media.nested_block(".a").unwrap();
    assert_eq!(inner.get("width"), Some(&Value::Number(Number::new(50.0, Unit::Percent))));
}

#[test]
fn test_unterminated_block_is_closed_with_warning() {
    let parsed = parse(".x { color: red");
    let x = parsed.stylesheet.get(".x").unwrap();
    assert_eq!(x.get("color").and_then(Value::keyword_name), Some("red"));
    assert!(matches!(x.get("color"), Some(Value::Keyword(Keyword::Color { .. }))));
    assert_eq!(
        parsed.warnings,
        vec![Warning::Parse(ParseWarning::UnterminatedBlock {
            key: ".x".to_string(),
            offset: 3,
        })]
    );
}

#[test]
fn test_url_and_keyword_are_both_kept() {
    let sheet = stylesheet("div { background: url(foo.png) no-repeat; }");
    let background = sheet.get("div").unwrap().get("background").unwrap();
    assert_eq!(
        background,
        &Value::List(vec![
            Value::Url("foo.png".to_string()),
            Value::Keyword(Keyword::Ident("no-repeat".to_string())),
        ])
    );
}

#[test]
fn test_block_order_and_keys() {
    let sheet = stylesheet("b { } a { } @font-face { } { x: 1 }");
    let keys: Vec<&str> = sheet.blocks().iter().map(|block| block.key.as_str()).collect();
    assert_eq!(&keys[..3], ["b", "a", "@font-face"]);
    let orders: Vec<usize> = sheet.blocks().iter().map(|block| block.order).collect();
    assert_eq!(orders, [0, 1, 2, 3]);

    let anonymous = &sheet.blocks()[3];
    assert_eq!(anonymous.kind, BlockKind::Anonymous);
    assert_eq!(anonymous.key.len(), 36);
    assert_eq!(anonymous.key.as_bytes()[14], b'4');
}

#[test]
fn test_anonymous_keys_are_deterministic_with_seed() {
    let source = "{ a: 1 } { b: 2 }";
    let first = parse(source).stylesheet;
    let second = parse(source).stylesheet;
    assert_eq!(first, second);
    assert_ne!(first.blocks()[0].key, first.blocks()[1].key);
}

#[test]
fn test_empty_body_marker() {
    let sheet = stylesheet(".card { .shadow; padding: 4px; }");
    let card = sheet.get(".card").unwrap();
    let marker = card.nested_block(".shadow").unwrap();
    assert!(marker.is_empty_marker());
    assert!(!card.is_empty_marker());
    assert_eq!(card.get("padding"), Some(&px(4.0)));
}

#[test]
fn test_blockless_at_rules() {
    let sheet = stylesheet("@charset \"utf-8\";\n@import url(base.less);\n.a { b: c }");
    assert!(sheet.get("@charset \"utf-8\"").unwrap().is_empty_marker());
    assert!(sheet.get("@import url(base.less)").unwrap().is_empty_marker());
}

#[test]
fn test_stray_close_brace() {
    let parsed = parse("} .a { b: c }");
    assert_eq!(
        parsed.warnings,
        vec![Warning::Parse(ParseWarning::UnexpectedCloseBrace { offset: 0 })]
    );
    assert!(parsed.stylesheet.get(".a").is_some());
}

#[test]
fn test_malformed_declaration_is_skipped() {
    let parsed = parse(".a { 12px: red; color: blue; }");
    assert!(matches!(
        parsed.warnings.as_slice(),
        [Warning::Parse(ParseWarning::MalformedDeclaration { .. })]
    ));
    let a = parsed.stylesheet.get(".a").unwrap();
    assert_eq!(a.declarations.len(), 1);
    assert_eq!(a.get("color").and_then(Value::as_color), Some(Color::rgb(0, 0, 255)));
}

#[test]
fn test_unknown_blockless_at_rule() {
    let parsed = parse("@foo bar; .a { b: c }");
    match parsed.warnings.as_slice() {
        [Warning::Parse(ParseWarning::UnknownAtRule { keyword, offset })] => {
            assert_eq!(keyword, "foo");
            assert_eq!(*offset, 0);
        }
        other => panic!("Expected one unknown at-rule warning, got {other:?}"),
    }
}

#[test]
fn test_cdo_cdc_ignored() {
    let sheet = stylesheet("<!-- .a { b: c } -->");
    assert_eq!(sheet.len(), 1);
}

#[test]
fn test_important_is_not_overridden() {
    let sheet = stylesheet(".a { color: red !important; color: blue; }");
    let a = sheet.get(".a").unwrap();
    assert!(a.is_important("color"));
    assert_eq!(a.get("color").and_then(Value::keyword_name), Some("red"));
}

#[test]
fn test_later_declaration_wins() {
    let sheet = stylesheet(".a { color: red; margin: 0; color: blue; }");
    let a = sheet.get(".a").unwrap();
    let keys: Vec<&str> = a.declarations.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys, ["color", "margin"]);
    assert_eq!(a.get("color").and_then(Value::keyword_name), Some("blue"));
}

#[test]
fn test_vendor_prefixed_group_prefers_plain_form() {
    let sheet = stylesheet(".a { transition: all 1s; -webkit-transition: opacity 2s; -moz-transition: none; }");
    let a = sheet.get(".a").unwrap();
    assert_eq!(a.declarations.len(), 1);
    let transition = a.declaration("transition").unwrap();
    assert_eq!(transition.property, "transition");
    assert_eq!(transition.value.to_string(), "all 1s");
}

#[test]
fn test_variables() {
    let parsed = parse("@accent: #00f;\n@pad = 4px;\n.a { color: @accent; margin: @pad @pad; }");
    assert!(parsed.warnings.is_empty());
    let sheet = parsed.stylesheet;
    let a = sheet.get(".a").unwrap();
    assert_eq!(a.get("color"), Some(&Value::Color(Color::rgb(0, 0, 255))));
    assert_eq!(a.get("margin"), Some(&Value::List(vec![px(4.0), px(4.0)])));
    assert_eq!(sheet.variable("pad"), Some(&px(4.0)));
}

#[test]
fn test_global_block_variables() {
    let sheet = stylesheet("@global { @blue = #0000ff; }\n.a { color: @blue; }");
    assert_eq!(sheet.variable("blue").and_then(Value::as_color), Some(Color::rgb(0, 0, 255)));
    assert_eq!(sheet.get(".a").unwrap().get("color").and_then(Value::as_color), Some(Color::rgb(0, 0, 255)));
}

#[test]
fn test_block_variables_shadow_globals() {
    let sheet = stylesheet("@c: red; .a { @c: blue; color: @c; .b { color: @c; } } .d { color: @c; }");
    let a = sheet.get(".a").unwrap();
    assert_eq!(a.get("color").and_then(Value::keyword_name), Some("blue"));
    assert_eq!(a.nested_block(".b").unwrap().get("color").and_then(Value::keyword_name), Some("blue"));
    assert_eq!(sheet.get(".d").unwrap().get("color").and_then(Value::keyword_name), Some("red"));
}

#[test]
fn test_undefined_variable_falls_back() {
    let parsed = parse(".a { color: @missing; }");
    assert_eq!(
        parsed.stylesheet.get(".a").unwrap().get("color"),
        Some(&Value::Raw("@missing".to_string()))
    );
    match parsed.warnings.as_slice() {
        [Warning::Fallback(fallback)] => {
            assert_eq!(fallback.property, "color");
            assert_eq!(fallback.raw, "@missing");
        }
        other => panic!("Expected one fallback, got {other:?}"),
    }
}

#[test]
fn test_exponential_variable_chain_is_capped() {
    let mut source = String::from("@v0: x x;\n");
    for level in 1..=24 {
        source.push_str(&format!("@v{level}: @v{0} @v{0};\n", level - 1));
    }
    source.push_str(".a { w: @v24; }");

    let parsed = parse(&source);
    let sheet = &parsed.stylesheet;
    assert_eq!(sheet.get(".a").unwrap().get("w"), Some(&Value::Raw("@v24".to_string())));
    assert_eq!(sheet.variable("v24"), Some(&Value::Raw("@v24".to_string())));
    assert_eq!(sheet.variable("v1").unwrap().components().len(), 4);

    let capped = parsed.warnings.iter().any(|warning| {
        matches!(warning, Warning::Fallback(fallback)
            if fallback.property == "w" && fallback.reason == FallbackReason::ExpansionLimit)
    });
    assert!(capped, "missing expansion-limit fallback: {:?}", parsed.warnings);
}

#[test]
fn test_nesting_depth() {
    let depth = 10;
    let source = format!("{}x: 1;{}", ".n { ".repeat(depth), " }".repeat(depth));
    let sheet = stylesheet(&source);

    let mut block = sheet.get(".n").unwrap();
    let mut levels = 1;
    while let Some(inner) = block.nested_block(".n") {
        block = inner;
        levels += 1;
    }
    assert_eq!(levels, depth);
    assert_eq!(block.get("x"), Some(&Value::Number(Number::new(1.0, Unit::None))));
    assert_eq!(sheet.walk().count(), depth);
    assert_eq!(sheet.declarations().count(), 1);
}

#[test]
fn test_nesting_too_deep() {
    let source = "a { ".repeat(5);
    let options = quiet().with_max_depth(4);
    let result = parse_with(&source, &options, &mut SeededIds::new(0));
    assert!(matches!(
        result,
        Err(Error::Parse(ParseError::NestingTooDeep { limit: 4, offset: 18 }))
    ));

    let options = quiet().with_max_depth(5);
    assert!(parse_with(&source, &options, &mut SeededIds::new(0)).is_ok());
}

#[test]
fn test_strict_mode_promotes_first_warning() {
    let options = quiet().with_strict(true);
    let result = parse_with(".x { color: red", &options, &mut SeededIds::new(0));
    match result {
        Err(Error::Parse(ParseError::Strict(ParseWarning::UnterminatedBlock { key, .. }))) => {
            assert_eq!(key, ".x");
        }
        other => panic!("Expected strict failure, got {other:?}"),
    }
}

#[test]
fn test_parse_bytes_rejects_invalid_utf8() {
    let result = parse_bytes(b".a { b: c }\xff", &quiet(), &mut SeededIds::new(0));
    assert!(matches!(result, Err(Error::Lex(_))));
    assert!(parse_bytes(b".a { b: c }", &quiet(), &mut SeededIds::new(0)).is_ok());
}

#[test]
fn test_flattened_declarations_follow_document_order() {
    let sheet = stylesheet(".a { x: 1; .b { y: 2; } z: 3; } .c { w: 4; }");
    let keys: Vec<&str> = sheet.declarations().map(|d| d.key.as_str()).collect();
    assert_eq!(keys, ["x", "z", "y", "w"]);
}

#[test]
fn test_reserialization_is_equivalent() {
    let source = r#"
        @accent: #336699;
        .btn, .link { color: @accent; font: 12px/1.5 "Helvetica Neue", Arial; }
        @media screen and (max-width: 600px) {
            .btn { margin: 0 auto !important; background: url("a b.png") no-repeat; }
        }
        { anonymous: yes; }
        .card { .shadow; transform: translate(1px, -2em) rotate(45deg); }
        .id { target: #foo\.bar #\61 bc; }
    "#;
    let first = stylesheet(source);
    let text = first.to_string();
    let second = stylesheet(&text);
    assert_eq!(first, second, "re-serialized text:\n{text}");
}

#[test]
fn test_escaped_hash_prints_back_as_one_id() {
    let first = stylesheet(r".a { b: #foo\.bar; c: #\61 bc; }");
    let block = first.get(".a").unwrap();
    assert_eq!(block.get("b"), Some(&Value::Hash("foo.bar".to_string())));
    assert_eq!(block.get("c"), Some(&Value::Hash("abc".to_string())));

    let second = stylesheet(&first.to_string());
    assert_eq!(first, second);
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_output_types_are_send_and_sync() {
    assert_send_sync::<Stylesheet>();
    assert_send_sync::<Parsed>();
    assert_send_sync::<Value>();
    assert_send_sync::<Token>();
}

#[test]
fn test_parses_on_separate_threads_are_independent() {
    let results: Vec<Parsed> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                scope.spawn(move || {
                    let source = format!("@w: {i}px; .t{i} {{ width: @w; }} {{ n: {i}; }}");
                    parse_with(&source, &quiet(), &mut RandomIds).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    for (parsed, i) in results.iter().zip(0u32..) {
        let sheet = &parsed.stylesheet;
        assert!(parsed.warnings.is_empty());
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.variable("w"), Some(&px(f64::from(i))));
        assert_eq!(sheet.get(&format!(".t{i}")).unwrap().get("width"), Some(&px(f64::from(i))));
        assert!(sheet.get(&format!(".t{}", (i + 1) % 4)).is_none());
    }

    let anonymous: HashSet<&str> = results.iter().map(|p| p.stylesheet.blocks()[1].key.as_str()).collect();
    assert_eq!(anonymous.len(), results.len());
}

#[test]
fn test_serialize_to_json() {
    let sheet = stylesheet(".a { width: 50%; }");
    let json = serde_json::to_value(&sheet).unwrap();
    let declaration = &json["blocks"][0]["declarations"][0];
    assert_eq!(declaration["key"], "width");
    assert_eq!(declaration["value"]["type"], "number");
    assert_eq!(declaration["value"]["value"]["unit"], "%");
}
