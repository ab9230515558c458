//! Stress tests - wide and deep stack trees
//!
//! Run with: cargo test --package ora-core --test stress_test
//!
use ora_core::{Container, LoadConfig, MAX_DEPTH_CEILING};
use ora_test_utils::{GeneratedArchive, OraFixture, Shape, BLACK};
use std::io::Cursor;
use std::time::Instant;

fn load_with(generated: &GeneratedArchive, workers: usize) -> Container {
    let mut container = Container::with_config(LoadConfig::new().with_max_workers(workers));
    container
        .load(Cursor::new(generated.bytes.clone()))
        .expect("stress archive should load");
    container
}

#[test]
fn stress_test_wide_stack() {
    println!("\n[STRESS TEST] Loading 1,000 sibling layers...");
    let generated = GeneratedArchive::from_shapes(&vec![Shape::Layer; 1_000]);

    let start = Instant::now();
    let container = load_with(&generated, 4);
    println!("  Completed in {:.2}s", start.elapsed().as_secs_f64());

    assert_eq!(container.len(), 1_000, "Expected 1,000 indexed layers");
    assert_eq!(container.root_group().unwrap().children().len(), 1_000);
    assert_eq!(container.get_by_uuid("layer-999").unwrap().name(), "Layer 999");
}

#[test]
fn stress_test_deep_chain_on_two_workers() {
    println!("\n[STRESS TEST] Loading a 64-level nested stack on 2 workers...");
    let mut shape = Shape::Layer;
    for _ in 0..64 {
        shape = Shape::Stack(vec![shape, Shape::Layer]);
    }
    let generated = GeneratedArchive::from_shapes(&[shape]);

    let container = load_with(&generated, 2);

    // nested joins must not starve the bounded pool
    assert_eq!(container.len(), generated.item_count());
    assert_eq!(container.layers().len(), generated.layers);
}

#[test]
fn stress_test_bushy_tree_single_worker() {
    println!("\n[STRESS TEST] Loading a bushy tree on 1 worker...");
    let level = |children: Vec<Shape>| Shape::Stack(children);
    let leafs = || vec![Shape::Layer, Shape::Other, Shape::Layer, Shape::Layer];
    let shapes: Vec<Shape> = (0..8)
        .map(|_| level((0..6).map(|_| level(leafs())).collect()))
        .collect();
    let generated = GeneratedArchive::from_shapes(&shapes);

    let container = load_with(&generated, 1);

    assert_eq!(container.len(), generated.item_count());
    for uuid in &generated.uuids {
        assert!(container.get_by_uuid(uuid).is_ok(), "{uuid} missing");
    }
    println!("  ✓ {} items indexed", container.len());
}

#[test]
fn stress_test_nesting_at_depth_ceiling() {
    // image + top-level stack + nested stacks + layer fills the ceiling exactly
    let nested = MAX_DEPTH_CEILING - 3;
    println!("\n[STRESS TEST] Loading {nested} nested stacks on 2 workers...");
    let xml = format!(
        "<image><stack>{}<layer uuid=\"leaf\" src=\"leaf.png\"/>{}</stack></image>",
        "<stack>".repeat(nested),
        "</stack>".repeat(nested)
    );
    let bytes = OraFixture::new()
        .with_stack_xml(&xml)
        .with_png("leaf.png", 1, 1, BLACK)
        .build();

    let mut container = Container::with_config(
        LoadConfig::new()
            .with_max_workers(2)
            .with_max_depth(MAX_DEPTH_CEILING),
    );
    container
        .load(Cursor::new(bytes))
        .expect("nesting at the ceiling should load");

    assert_eq!(container.len(), nested + 1);
    assert_eq!(container.layers().len(), 1);
}
