//! Integration test: parse a recorded `make` build, run it through
//! flatten -> layout -> render, and drive the panel through the surface.

use tracetree_core::parsers::parse_process_tree;
use tracetree_core::pipeline::{Source, load};
use tracetree_core::views::chart::bar_rect;
use tracetree_core::{ChartConfig, PanelState, Surface, flatten, render_chart};
use tracetree_protocol::{PanelEvent, Point};

const MAKE_BUILD: &[u8] = include_bytes!("fixtures/make-build.json");

#[test]
fn flatten_keeps_every_process_in_tree_order() {
    let tree = parse_process_tree(MAKE_BUILD).expect("failed to parse fixture");
    let rows = flatten(&tree);
    assert_eq!(rows.len(), tree.node_count());
    let pids: Vec<_> = rows.iter().map(|r| r.pid).collect();
    assert_eq!(pids, vec![4100, 4101, 4102, 4103, 4104, 4105, 4106]);
    assert_eq!(rows[0].cmd, "make");
    assert_eq!(rows[0].elapsed, "10.000s");
    assert_eq!(rows[6].cmd, "<unknown>");
}

#[test]
fn chart_orders_rows_by_start_and_scales_them() {
    let tree = parse_process_tree(MAKE_BUILD).expect("failed to parse fixture");
    let chart = render_chart(&tree, 1000.0).expect("failed to lay out");

    let pids: Vec<_> = chart.timeline.rows.iter().map(|r| r.row.pid).collect();
    // Equal start times keep their depth-first order.
    assert_eq!(pids, vec![4100, 4101, 4103, 4102, 4104, 4105, 4106]);

    let ld = &chart.timeline.rows[5];
    assert!((ld.offset_px - 200.0).abs() < 1e-6);
    assert!((ld.raw_width_px - 5.0).abs() < 1e-6);
    assert!((ld.width_px - 5.0).abs() < 1e-6);
    assert_eq!(ld.start_label, "2.000s");
    assert_eq!(ld.end_label, "2.050s");

    let blip = &chart.timeline.rows[6];
    assert!(blip.raw_width_px < 1.0);
    assert_eq!(blip.width_px, 4.0);

    let labels: Vec<_> = chart.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["make", "sh", "sh", "gcc", "gcc", "ld", "<unknown>"]);
}

#[test]
fn rendering_twice_gives_identical_output() {
    let tree = parse_process_tree(MAKE_BUILD).expect("failed to parse fixture");
    let first = render_chart(&tree, 873.0).expect("failed to lay out");
    let second = render_chart(&tree, 873.0).expect("failed to lay out");
    assert_eq!(first, second);
}

#[test]
fn clicking_a_bar_opens_the_panel_and_background_closes_it() {
    let tree = parse_process_tree(MAKE_BUILD).expect("failed to parse fixture");
    let config = ChartConfig::default();
    let chart = render_chart(&tree, 1000.0).expect("failed to lay out");
    let ld_bar = bar_rect(&chart.rows[5], &config);

    let mut surface = Surface::new(config);
    assert_eq!(surface.apply(chart), None);

    let at = Point::new(ld_bar.x + 1.0, ld_bar.y + 1.0);
    let event = surface.click(at).expect("bar click should open the panel");
    assert_eq!(event.field("pid"), Some("4105"));
    assert_eq!(event.field("cmdline"), Some("/usr/bin/ld -o app main.o util.o"));
    assert_eq!(event.field("elapsed"), Some("0.050s"));
    assert_eq!(event.field("startpretty"), Some("2.000s"));
    assert!(matches!(event, PanelEvent::Open { anchor, .. } if anchor == at));
    assert!(matches!(surface.panel(), PanelState::Visible { content, .. } if content.row.pid == 4105));

    assert_eq!(surface.click(Point::new(2.0, 2.0)), Some(PanelEvent::Close));
    assert_eq!(surface.panel(), &PanelState::Hidden);
}

#[test]
fn demo_dataset_renders() {
    let tree = load(&Source::Demo).expect("failed to load demo");
    let chart = render_chart(&tree, 1200.0).expect("failed to lay out");
    assert_eq!(chart.len(), tree.node_count());
    assert_eq!(chart.rows[0].label, "cargo");
    assert!(chart.rows.iter().all(|r| r.bar.width_px >= 4.0));
}
