use ora_core::prelude::*;
use ora_core::ParseError;
use ora_test_utils::{two_layer_archive, OraFixture, BLACK};
use std::io::Cursor;

fn load_err(bytes: Vec<u8>) -> (Container, OraError) {
    let mut container = Container::new();
    let err = container
        .load(Cursor::new(bytes))
        .expect_err("load should fail");
    (container, err)
}

#[test]
fn garbage_archive() {
    let (container, err) = load_err(b"PK not really".to_vec());

    assert!(matches!(err, OraError::ContainerOpen(_)));
    assert!(container.root_group().is_none());
}

#[test]
fn missing_descriptor() {
    let bytes = OraFixture::new()
        .without_descriptor()
        .with_png("data/layer1.png", 1, 1, BLACK)
        .build();
    let (container, err) = load_err(bytes);

    assert!(matches!(err, OraError::DescriptorNotFound { ref name } if name == "stack.xml"));
    assert!(container.root_group().is_none());
    assert!(container.is_empty());
}

#[test]
fn malformed_descriptor() {
    let bytes = OraFixture::new()
        .with_stack_xml("<image><stack><layer></stack>")
        .build();
    let (container, err) = load_err(bytes);

    assert!(matches!(err, OraError::ParseFailure(ParseError::Markup(_))));
    assert!(container.root_group().is_none());
}

#[test]
fn descriptor_without_top_level_stack() {
    let bytes = OraFixture::new().with_stack_xml("<image/>").build();
    let (_, err) = load_err(bytes);

    assert!(matches!(
        err,
        OraError::ParseFailure(ParseError::MissingRootStack)
    ));
}

#[test]
fn missing_layer_entry_keeps_completed_siblings() {
    let xml = r#"<image><stack>
        <layer uuid="ok" name="Fine" src="data/ok.png"/>
        <layer uuid="broken" src="data/missing.png"/>
        <stack uuid="grp"><layer uuid="nested" src="data/ok.png"/></stack>
    </stack></image>"#;
    let bytes = OraFixture::new()
        .with_stack_xml(xml)
        .with_png("data/ok.png", 2, 2, BLACK)
        .build();
    let (container, err) = load_err(bytes);

    assert!(matches!(err, OraError::EntryNotFound { ref path } if path == "data/missing.png"));

    // siblings are joined before the error surfaces, nothing is rolled back
    assert_eq!(container.get_by_uuid("ok").unwrap().name(), "Fine");
    assert!(container.get_by_uuid("nested").is_ok());
    assert!(container.get_by_uuid("grp").is_ok());
    assert!(container.get_by_uuid("broken").is_err());
    assert!(container.root_group().is_none());
}

#[test]
fn undecodable_layer() {
    let xml = r#"<image><stack><layer uuid="bad" src="data/bad.png"/></stack></image>"#;
    let bytes = OraFixture::new()
        .with_stack_xml(xml)
        .with_entry("data/bad.png", b"\x89PNG but truncated".to_vec())
        .build();
    let (_, err) = load_err(bytes);

    assert!(matches!(err, OraError::DecodeFailure { ref path, .. } if path == "data/bad.png"));
}

#[test]
fn layer_without_src() {
    let xml = r#"<image><stack><layer uuid="nosrc"/></stack></image>"#;
    let (_, err) = load_err(OraFixture::new().with_stack_xml(xml).build());

    assert!(matches!(err, OraError::EntryNotFound { ref path } if path.is_empty()));
}

#[test]
fn deep_failure_fails_whole_load() {
    let xml = r#"<image><stack>
        <stack uuid="a"><stack uuid="b"><stack uuid="c">
            <layer uuid="leaf" src="nowhere.png"/>
        </stack></stack></stack>
    </stack></image>"#;
    let (container, err) = load_err(OraFixture::new().with_stack_xml(xml).build());

    assert!(matches!(err, OraError::EntryNotFound { ref path } if path == "nowhere.png"));
    assert!(container.root_group().is_none());
    assert!(container.get_by_uuid("leaf").is_err());

    // groups on the failing path stay indexed with the children that built
    let a = container.get_by_uuid("a").unwrap();
    let b = container.get_by_uuid("b").unwrap();
    let c = container.get_by_uuid("c").unwrap();
    assert!(std::sync::Arc::ptr_eq(&a.children()[0], &b));
    assert!(std::sync::Arc::ptr_eq(&b.children()[0], &c));
    assert!(c.children().is_empty());
    assert_eq!(container.len(), 3);
}

fn nested_stacks(levels: usize) -> String {
    format!(
        "<image><stack>{}<layer uuid=\"leaf\" src=\"leaf.png\"/>{}</stack></image>",
        "<stack>".repeat(levels),
        "</stack>".repeat(levels)
    )
}

#[test]
fn pathologically_deep_nesting_is_rejected() {
    let bytes = OraFixture::new()
        .with_stack_xml(&nested_stacks(2_000))
        .with_png("leaf.png", 1, 1, BLACK)
        .build();
    let mut container = Container::with_config(LoadConfig::new().with_max_workers(2));

    let err = container.load(Cursor::new(bytes)).unwrap_err();

    assert!(matches!(
        err,
        OraError::ParseFailure(ParseError::TooDeep { max: ora_core::DEFAULT_MAX_DEPTH })
    ));
    assert!(container.root_group().is_none());
    assert!(container.document().is_none());
    assert!(container.is_empty());
}

#[test]
fn nesting_limit_follows_config() {
    let bytes = || {
        OraFixture::new()
            .with_stack_xml(&nested_stacks(8))
            .with_png("leaf.png", 1, 1, BLACK)
            .build()
    };

    // image, top-level stack, 8 nested stacks, layer: 11 levels
    let mut shallow = Container::with_config(LoadConfig::new().with_max_depth(10));
    let err = shallow.load(Cursor::new(bytes())).unwrap_err();
    assert!(matches!(err, OraError::ParseFailure(ParseError::TooDeep { max: 10 })));

    let mut exact = Container::with_config(LoadConfig::new().with_max_depth(11));
    exact.load(Cursor::new(bytes())).unwrap();
    assert_eq!(exact.len(), 9);
}

#[test]
fn second_load_is_rejected() {
    let mut container = Container::new();
    container.load(Cursor::new(two_layer_archive())).unwrap();

    let err = container
        .load(Cursor::new(two_layer_archive()))
        .unwrap_err();

    assert!(matches!(err, OraError::AlreadyLoaded));
    assert_eq!(container.len(), 2);
}

#[test]
fn load_after_failure_is_rejected() {
    let (mut container, _) = load_err(b"junk".to_vec());
    assert!(container.is_loaded());

    let err = container
        .load(Cursor::new(two_layer_archive()))
        .unwrap_err();
    assert!(matches!(err, OraError::AlreadyLoaded));
}

#[test]
fn open_missing_file() {
    let err = Container::open("/definitely/not/here.ora").unwrap_err();
    assert!(matches!(err, OraError::Io { .. }));
}
