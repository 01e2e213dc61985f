//! Integration tests: bidirectional canvas sync (easel-editor ↔ easel-scene).
//!
//! Exercises the reconciliation engine across the crate boundary: the
//! idempotence and rebuild properties, echo suppression in both
//! directions, the asset lifecycle, and the interactive-resize
//! scale-settling behavior.

use easel_core::model::{
    CanvasElement, Color, Dimensions, ElementKind, ImageFilters, ImageProps, ShapeKind,
    ShapeProps, TextProps, VideoProps,
};
use easel_core::transform::NodeGeometry;
use easel_core::{ElementId, ProjectType};
use easel_editor::{EditorStore, SyncEngine, ViewportController};
use easel_scene::{hit_test, hit_test_rect, Canvas, DeferredAssets, SceneEvent, StaticAssets};
use pretty_assertions::assert_eq;

const CANVAS: Dimensions = Dimensions {
    width: 1080.0,
    height: 1080.0,
};

fn store() -> EditorStore {
    let _ = env_logger::builder().is_test(true).try_init();
    EditorStore::create("sync test", ProjectType::Design, CANVAS)
}

fn canvas_for(store: &EditorStore) -> Canvas {
    Canvas::new(store.project().dimensions, store.project().background_color)
}

fn rect(name: &str, x: f32, y: f32, w: f32, h: f32) -> CanvasElement {
    CanvasElement::new(
        name,
        ElementKind::Shape(ShapeProps {
            shape_type: ShapeKind::Rectangle,
            fill: Color::from_hex("#6c5ce7").unwrap(),
            stroke: Color::BLACK,
            stroke_width: 1.0,
            corner_radius: None,
            points: None,
        }),
    )
    .with_frame(x, y, w, h)
}

fn text(name: &str, content: &str) -> CanvasElement {
    CanvasElement::new(
        name,
        ElementKind::Text(TextProps {
            content: content.into(),
            ..Default::default()
        }),
    )
    .with_frame(10.0, 10.0, 300.0, 40.0)
}

fn image(name: &str, src: &str, w: f32, h: f32) -> CanvasElement {
    CanvasElement::new(
        name,
        ElementKind::Image(ImageProps {
            src: src.into(),
            original_src: src.into(),
            filters: ImageFilters::default(),
            crop_area: None,
            aspect_locked: false,
        }),
    )
    .with_frame(50.0, 50.0, w, h)
}

fn photo_assets() -> StaticAssets {
    let mut assets = StaticAssets::new();
    assets.insert(
        "beach.jpg",
        Dimensions {
            width: 800.0,
            height: 600.0,
        },
    );
    assets
}

// ─── Idempotence ─────────────────────────────────────────────────────────

#[test]
fn second_reconcile_writes_nothing() {
    let mut store = store();
    store.add_element(rect("a", 100.0, 100.0, 80.0, 80.0));
    store.add_element(text("t", "hello"));
    store.add_element(
        CanvasElement::new(
            "clip",
            ElementKind::Video(VideoProps {
                src: "clip.mp4".into(),
                duration: 12.0,
                start_time: 0.0,
                end_time: 12.0,
                volume: 1.0,
                muted: true,
                looped: false,
            }),
        )
        .with_frame(0.0, 0.0, 640.0, 360.0),
    );

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();

    let first = engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert_eq!(first.nodes_created, 3);

    let second = engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert_eq!(second.nodes_created, 0);
    assert_eq!(second.nodes_removed, 0);
    assert_eq!(second.property_writes, 0, "second pass must be a no-op");
}

// ─── Rebuild round-trip ──────────────────────────────────────────────────

#[test]
fn rebuilt_scene_matches_original() {
    let mut store = store();
    let a = store.add_element(rect("a", 100.0, 100.0, 80.0, 80.0));
    let b = store.add_element(text("t", "hello"));
    let c = store.add_element(image("photo", "beach.jpg", 400.0, 300.0));
    store.update_element(a, |el| el.transform.rotation = 30.0);
    store.bring_to_front(a);

    let mut assets = photo_assets();
    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    // Two passes: the image node lands once its load resolves.
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    let snapshot: Vec<(ElementId, NodeGeometry)> = [b, c, a]
        .iter()
        .map(|&id| (id, canvas.geometry(id).unwrap()))
        .collect();
    let order = canvas.painter_order();

    // The scene is a disposable cache: destroy it and rebuild from the
    // document alone.
    let mut rebuilt = canvas_for(&store);
    let mut engine2 = SyncEngine::new();
    engine2.reconcile(&mut store, &mut rebuilt, &mut assets);
    engine2.reconcile(&mut store, &mut rebuilt, &mut assets);

    for (id, geometry) in snapshot {
        assert_eq!(rebuilt.geometry(id), Some(geometry), "geometry of {id}");
    }
    assert_eq!(rebuilt.painter_order(), order);
    assert_eq!(rebuilt.z_position(a), Some(3));
}

// ─── Loop suppression ────────────────────────────────────────────────────

#[test]
fn user_move_writes_document_exactly_once() {
    let mut store = store();
    let id = store.add_element(rect("a", 100.0, 100.0, 80.0, 80.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    engine.pump_events(&mut store, &mut canvas);

    // User drags the node.
    assert!(canvas.user_translate(id, 30.0, 20.0));
    let writes = engine.pump_events(&mut store, &mut canvas);
    assert_eq!(writes, 1);
    let t = store.project().element(id).unwrap().transform;
    assert_eq!((t.x, t.y), (130.0, 120.0));

    // The follow-up reconcile may touch the node (snap-to-rounded), but
    // its events are echoes and must not ping-pong back into the store.
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    let echo_writes = engine.pump_events(&mut store, &mut canvas);
    assert_eq!(echo_writes, 0, "echo must not re-enter the document");
    let t = store.project().element(id).unwrap().transform;
    assert_eq!((t.x, t.y), (130.0, 120.0));

    // And the system is quiescent afterwards.
    let stats = engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert_eq!(stats.property_writes, 0);
}

#[test]
fn programmatic_push_does_not_bounce() {
    let mut store = store();
    let id = store.add_element(rect("a", 0.0, 0.0, 50.0, 50.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    engine.pump_events(&mut store, &mut canvas);

    // Property panel moves the element.
    let mut t = store.project().element(id).unwrap().transform;
    t.x = 250.0;
    store.set_transform(id, t);
    let revision_after_edit = store.revision();

    engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert_eq!(canvas.geometry(id).unwrap().left, 250.0);

    // The scene emitted a modified event for that push; pumping it must
    // not write the document again.
    assert_eq!(engine.pump_events(&mut store, &mut canvas), 0);
    assert_eq!(store.revision(), revision_after_edit);
}

#[test]
fn user_gesture_during_settle_window_still_lands() {
    let mut store = store();
    let id = store.add_element(rect("a", 0.0, 0.0, 50.0, 50.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    engine.pump_events(&mut store, &mut canvas);

    // A programmatic push whose echo has not been pumped yet…
    let mut t = store.project().element(id).unwrap().transform;
    t.x = 100.0;
    store.set_transform(id, t);
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    // …while the user immediately starts a second gesture. A boolean
    // settle flag would swallow it; generation tags must not.
    assert!(canvas.user_translate(id, 0.0, 40.0));

    let writes = engine.pump_events(&mut store, &mut canvas);
    assert_eq!(writes, 1);
    let t = store.project().element(id).unwrap().transform;
    assert_eq!((t.x, t.y), (100.0, 40.0));
}

// ─── Selection ───────────────────────────────────────────────────────────

#[test]
fn stale_selection_ids_are_pruned() {
    let mut store = store();
    let a = store.add_element(rect("a", 0.0, 0.0, 10.0, 10.0));
    let ghost = ElementId::intern("ghost");
    store.select_many(&[a, ghost]);

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    assert_eq!(store.selected(), &[a]);
    assert_eq!(canvas.active(), &[a]);
}

#[test]
fn scene_selection_flows_to_store_without_ping_pong() {
    let mut store = store();
    let a = store.add_element(rect("a", 0.0, 0.0, 10.0, 10.0));
    let b = store.add_element(rect("b", 30.0, 30.0, 10.0, 10.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    engine.pump_events(&mut store, &mut canvas);

    // User marquees both nodes.
    canvas.user_select(&[a, b]);
    engine.pump_events(&mut store, &mut canvas);
    assert_eq!(store.selected(), &[a, b]);

    // The document-side set now matches the scene; reconciling must not
    // emit a redundant selection push.
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert!(
        canvas.drain_events().is_empty(),
        "no redundant selection push"
    );
    assert_eq!(canvas.active(), &[a, b]);
}

#[test]
fn store_selection_drives_active_object() {
    let mut store = store();
    let a = store.add_element(rect("a", 0.0, 0.0, 10.0, 10.0));
    let b = store.add_element(rect("b", 30.0, 30.0, 10.0, 10.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    store.select(a, false);
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert_eq!(canvas.active(), &[a]);

    store.select(b, true);
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert_eq!(canvas.active(), &[a, b]);

    store.deselect_all();
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert!(canvas.active().is_empty());
}

// ─── Asset lifecycle ─────────────────────────────────────────────────────

#[test]
fn image_node_appears_after_load_completes() {
    let mut store = store();
    let id = store.add_element(image("photo", "beach.jpg", 400.0, 300.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = DeferredAssets::new(photo_assets(), 1);

    // Pass 1 queues the load; pass 2 polls and stays pending.
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert!(!canvas.contains(id));
    let stats = engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert_eq!(stats.assets_pending, 1);
    assert!(!canvas.contains(id));

    // Pass 3 completes: the node lands with intrinsic box + derived scale.
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    let node = canvas.node(id).unwrap();
    assert_eq!((node.width, node.height), (800.0, 600.0));
    assert_eq!((node.scale_x, node.scale_y), (0.5, 0.5));
    assert_eq!(canvas.z_position(id), Some(1));
}

#[test]
fn deleting_element_mid_load_is_silent() {
    let mut store = store();
    let id = store.add_element(image("photo", "beach.jpg", 400.0, 300.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = DeferredAssets::new(photo_assets(), 5);

    engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert!(canvas.is_pending(id));

    store.delete_element(id);
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    assert!(!canvas.is_pending(id));
    assert!(!canvas.contains(id));
    assert!(canvas.drain_events().is_empty());
}

#[test]
fn failed_load_keeps_element_in_document() {
    let mut store = store();
    let id = store.add_element(image("photo", "corrupt.jpg", 400.0, 300.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    assets.insert_broken("corrupt.jpg", "decode error");

    engine.reconcile(&mut store, &mut canvas, &mut assets);
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    let events = canvas.drain_events();
    assert!(
        events
            .iter()
            .any(|e| matches!(e, SceneEvent::AssetFailed { id: failed, .. } if *failed == id)),
        "failure must surface as an event"
    );
    assert!(store.project().contains(id), "element survives the failure");
    assert!(!canvas.contains(id));
}

// ─── Scenarios from the interaction model ────────────────────────────────

#[test]
fn interactive_resize_settles_scale_to_one() {
    let mut store = store();
    let id = store.add_element(rect("box", 100.0, 100.0, 80.0, 80.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    engine.pump_events(&mut store, &mut canvas);

    // Corner-handle drag: the scene scales the node, the box is untouched.
    assert!(canvas.user_scale(id, 2.0, 1.0));
    engine.pump_events(&mut store, &mut canvas);

    let t = store.project().element(id).unwrap().transform;
    assert_eq!(t.width, 160.0);
    assert_eq!(t.scale_x, 1.0);
    assert_eq!(t.scale_y, 1.0);

    // Reconciling folds the scale back into the node's box.
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    let node = canvas.node(id).unwrap();
    assert_eq!(node.width, 160.0);
    assert_eq!(node.scale_x, 1.0);

    // Converged: nothing more to write.
    let stats = engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert_eq!(stats.property_writes, 0);
}

#[test]
fn image_resize_keeps_scale_factors() {
    let mut store = store();
    let id = store.add_element(image("photo", "beach.jpg", 400.0, 300.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = photo_assets();
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    engine.pump_events(&mut store, &mut canvas);

    // Scale the photo up by 2x interactively.
    assert!(canvas.user_scale(id, 2.0, 2.0));
    engine.pump_events(&mut store, &mut canvas);

    let t = store.project().element(id).unwrap().transform;
    assert_eq!((t.width, t.height), (800.0, 600.0));
    assert_eq!((t.scale_x, t.scale_y), (1.0, 1.0));

    engine.reconcile(&mut store, &mut canvas, &mut assets);
    let node = canvas.node(id).unwrap();
    // Intrinsic box stays; the target size lives in the scale factors.
    assert_eq!((node.width, node.height), (800.0, 600.0));
    assert_eq!((node.scale_x, node.scale_y), (1.0, 1.0));
}

#[test]
fn duplicate_lands_offset_in_scene() {
    let mut store = store();
    let orig = store.add_element(rect("box", 50.0, 50.0, 60.0, 60.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    let copy = store.duplicate_element(orig).unwrap();
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    let g_orig = canvas.geometry(orig).unwrap();
    let g_copy = canvas.geometry(copy).unwrap();
    assert_eq!((g_orig.left, g_orig.top), (50.0, 50.0));
    assert_eq!((g_copy.left, g_copy.top), (70.0, 70.0));
    assert_eq!(canvas.z_position(copy), Some(2));
}

#[test]
fn z_order_changes_reach_painter_order() {
    let mut store = store();
    let a = store.add_element(rect("a", 0.0, 0.0, 10.0, 10.0));
    let b = store.add_element(rect("b", 5.0, 5.0, 10.0, 10.0));
    let c = store.add_element(rect("c", 10.0, 10.0, 10.0, 10.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);
    assert_eq!(canvas.painter_order(), vec![a, b, c]);

    store.bring_to_front(a);
    store.send_backward(c);
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    let expected: Vec<ElementId> = store.project().element_ids().collect();
    assert_eq!(canvas.painter_order(), expected);
    for (i, el) in store.project().elements.iter().enumerate() {
        assert_eq!(el.z_index, i);
        assert_eq!(canvas.z_position(el.id), Some(i + 1));
    }
}

#[test]
fn text_edits_flow_back_to_document() {
    let mut store = store();
    let id = store.add_element(text("t", "hello"));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    assert!(canvas.user_edit_text(id, "hello world"));
    engine.pump_events(&mut store, &mut canvas);

    match &store.project().element(id).unwrap().kind {
        ElementKind::Text(props) => assert_eq!(props.content, "hello world"),
        other => panic!("expected text element, got {other:?}"),
    }
}

#[test]
fn pointer_to_selection_pipeline() {
    let mut store = store();
    let a = store.add_element(rect("a", 10.0, 10.0, 50.0, 50.0));
    let b = store.add_element(rect("b", 200.0, 200.0, 50.0, 50.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    // Screen positions pass through the viewport before hit testing.
    let mut viewport = ViewportController::new();
    viewport.set_zoom(2.0);
    let (cx, cy) = viewport.to_canvas(40.0, 40.0);
    assert_eq!(hit_test(&canvas, cx, cy), Some(a));

    // Marquee over everything, then the selection flows back to the store.
    let hits = hit_test_rect(&canvas, 0.0, 0.0, 300.0, 300.0);
    canvas.user_select(&hits);
    engine.pump_events(&mut store, &mut canvas);
    assert_eq!(store.selected(), &[a, b]);
}

#[test]
fn events_for_vanished_elements_are_noops() {
    let mut store = store();
    let id = store.add_element(rect("a", 0.0, 0.0, 10.0, 10.0));

    let mut canvas = canvas_for(&store);
    let mut engine = SyncEngine::new();
    let mut assets = StaticAssets::new();
    engine.reconcile(&mut store, &mut canvas, &mut assets);

    // The node emits a user event, then the element disappears before the
    // queue is pumped.
    canvas.user_translate(id, 5.0, 5.0);
    store.delete_element(id);

    assert_eq!(engine.pump_events(&mut store, &mut canvas), 0);
}
