//! End-to-end tests for the overlay: store, batching, bounds and history
//! working together through the public API.

use std::sync::Arc;

use redlilium_overlay::math::{Mat4, Vec3};
use redlilium_overlay::{
    Color, Line, LineId, MaterialBindingTable, MaterialHandle, OverlayComponent,
    OverlayDescriptor, OverlayEdit, OverlayEditHistory, OverlayError, OverlayVertex, Point,
    PointId, RenderDataHandoff, Triangle,
};
use rstest::rstest;

const LINE_MAT: MaterialHandle = MaterialHandle(1);
const POINT_MAT: MaterialHandle = MaterialHandle(2);
const MAT_A: MaterialHandle = MaterialHandle(10);
const MAT_B: MaterialHandle = MaterialHandle(11);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn overlay() -> OverlayComponent<MaterialBindingTable> {
    init_logging();
    OverlayComponent::with_listener(
        OverlayDescriptor::new(LINE_MAT, POINT_MAT).with_label("integration"),
        MaterialBindingTable::new(),
    )
}

fn line(x: f32) -> Line {
    Line::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x, 1.0, 0.0), Color::WHITE, 1.0)
}

fn point(y: f32) -> Point {
    Point::new(Vec3::new(0.0, y, 0.0), Color::YELLOW, 3.0)
}

fn tri(material: MaterialHandle, z: f32) -> Triangle {
    Triangle::flat(
        material,
        [
            Vec3::new(0.0, 0.0, z),
            Vec3::new(1.0, 0.0, z),
            Vec3::new(0.0, 1.0, z),
        ],
        Color::WHITE,
    )
}

// ---------------------------------------------------------------------------
// Batching
// ---------------------------------------------------------------------------

#[test]
fn end_to_end_scenario() {
    let mut o = overlay();
    o.add_line(line(0.0));
    o.add_line(line(1.0));
    o.add_point(point(2.0));
    o.add_triangle(tri(MAT_A, 0.0));
    o.add_triangle(tri(MAT_A, 1.0));
    o.add_triangle(tri(MAT_B, 2.0));

    let data = o.render_data();
    assert_eq!(data.batches().len(), 4);
    assert_eq!(data.vertex_count(), 21);
    assert_eq!(data.index_count(), 27);

    let batches = data.batches();
    assert_eq!(batches[0].material, LINE_MAT);
    assert_eq!(batches[0].material_slot, 0);
    assert_eq!(batches[0].index_range, 0..12);
    assert_eq!(batches[1].material, POINT_MAT);
    assert_eq!(batches[1].material_slot, 1);
    assert_eq!(batches[1].index_range, 12..18);
    assert_eq!(batches[2].material, MAT_A);
    assert_eq!(batches[2].material_slot, 2);
    assert_eq!(batches[2].primitive_count, 2);
    assert_eq!(batches[3].material, MAT_B);
    assert_eq!(batches[3].material_slot, 3);
    assert_eq!(batches[3].primitive_count, 1);
    assert_eq!(batches[3].index_range, 24..27);

    assert_eq!(o.material_slot_count(), 4);
    assert_eq!(
        data.vertex_bytes().len(),
        21 * OverlayVertex::STRIDE as usize
    );
}

#[rstest]
#[case::empty(0, 0, &[])]
#[case::lines_only(3, 0, &[])]
#[case::points_only(0, 5, &[])]
#[case::triangles_only(0, 0, &[2, 1])]
#[case::mixed(2, 1, &[2, 1, 4])]
fn buffer_sizes_match_primitive_counts(
    #[case] lines: usize,
    #[case] points: usize,
    #[case] triangles_per_material: &[usize],
) {
    let mut o = overlay();
    for i in 0..lines {
        o.add_line(line(i as f32));
    }
    for i in 0..points {
        o.add_point(point(i as f32));
    }
    for (m, &count) in triangles_per_material.iter().enumerate() {
        for i in 0..count {
            o.add_triangle(tri(MaterialHandle(100 + m as u64), i as f32));
        }
    }
    let triangles: usize = triangles_per_material.iter().sum();

    let data = o.render_data();
    assert_eq!(data.vertex_count() as usize, 4 * (lines + points) + 3 * triangles);
    assert_eq!(data.index_count() as usize, 6 * (lines + points) + 3 * triangles);

    let expected_batches = usize::from(lines > 0)
        + usize::from(points > 0)
        + triangles_per_material.iter().filter(|&&c| c > 0).count();
    assert_eq!(data.batches().len(), expected_batches);

    // Batches tile the index buffer without gaps.
    let mut cursor = 0;
    for batch in data.batches() {
        assert_eq!(batch.index_range.start, cursor);
        cursor = batch.index_range.end;
    }
    assert_eq!(cursor, data.index_count());
    for &index in data.indices() {
        assert!(index < data.vertex_count());
    }
}

#[test]
fn rebuilds_are_byte_identical() {
    let mut o = overlay();
    for i in 0..8 {
        o.add_line(line(i as f32));
        o.add_point(point(i as f32));
    }
    o.add_triangle(tri(MAT_B, 0.0));
    o.add_triangle(tri(MAT_A, 1.0));

    let first = o.build_render_data();
    let second = o.build_render_data();
    assert_eq!(first.vertex_bytes(), second.vertex_bytes());
    assert_eq!(first.index_bytes(), second.index_bytes());
    assert_eq!(first.batches(), second.batches());
}

#[test]
fn group_order_follows_material_index_not_insertion() {
    let mut o = overlay();
    let a = o.add_triangle(tri(MAT_A, 0.0));
    o.add_triangle(tri(MAT_B, 0.0));
    // Releasing group 0 frees its index for the next new material.
    o.remove_triangle(a).unwrap();
    o.add_triangle(tri(MaterialHandle(12), 0.0));

    let data = o.render_data();
    let materials: Vec<_> = data.batches().iter().map(|b| b.material).collect();
    assert_eq!(materials, [MaterialHandle(12), MAT_B]);
    assert_eq!(data.batches()[0].material_slot, 2);
}

// ---------------------------------------------------------------------------
// IDs and material slots
// ---------------------------------------------------------------------------

#[test]
fn ids_are_stable_and_slots_reused() {
    let mut o = overlay();
    let ids: Vec<LineId> = (0..4).map(|i| o.add_line(line(i as f32))).collect();
    o.remove_line(ids[1]).unwrap();
    o.remove_line(ids[2]).unwrap();

    // Surviving handles still address their original lines.
    assert_eq!(o.line(ids[3]).unwrap().start.x, 3.0);

    // Most recently freed slot is reused first.
    assert_eq!(o.add_line(line(9.0)), ids[2]);
    assert_eq!(o.add_line(line(9.0)), ids[1]);
    assert_eq!(o.add_line(line(9.0)), LineId::from_index(4));
}

#[test]
fn insert_into_occupied_slot_fails() {
    let mut o = overlay();
    let id = o.add_point(point(0.0));
    assert!(matches!(
        o.insert_point(id, point(1.0)),
        Err(OverlayError::HandleInUse { index: 0, .. })
    ));
    assert_eq!(o.point(id).unwrap().position.y, 0.0);

    o.insert_point(PointId::from_index(3), point(3.0)).unwrap();
    assert_eq!(o.point_count(), 2);
    // Gaps left by the explicit insert are handed out lowest first.
    assert_eq!(o.add_point(point(1.0)), PointId::from_index(1));
}

#[test]
fn material_slot_count_is_high_water_mark() {
    let mut o = overlay();
    let a = o.add_triangle(tri(MAT_A, 0.0));
    let b = o.add_triangle(tri(MAT_B, 0.0));
    assert_eq!(o.material_slot_count(), 4);

    o.remove_triangle(b).unwrap();
    o.remove_triangle(a).unwrap();
    assert_eq!(o.material_slot_count(), 4);
    assert_eq!(o.listener().bound_count(), 2);
    assert!(o.render_data().is_empty());

    o.clear();
    assert_eq!(o.material_slot_count(), 2);
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

#[test]
fn bounds_cover_all_primitives() {
    let mut o = overlay();
    o.add_line(Line::new(
        Vec3::zeros(),
        Vec3::new(10.0, 0.0, 0.0),
        Color::WHITE,
        1.0,
    ));
    o.add_point(Point::new(Vec3::new(0.0, 5.0, 0.0), Color::WHITE, 1.0));

    let bounds = o.bounds();
    assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 0.0));
    assert_eq!(bounds.max, Vec3::new(10.0, 5.0, 0.0));

    let world = o.world_bounds(&Mat4::new_scaling(2.0));
    assert_eq!(world.max, Vec3::new(20.0, 10.0, 0.0));
}

#[test]
fn bounds_recomputed_only_after_geometry_changes() {
    let mut o = overlay();
    let id = o.add_line(line(0.0));
    o.bounds();
    o.bounds();
    assert_eq!(o.bounds_recompute_count(), 1);

    o.set_line_color(id, Color::RED).unwrap();
    o.set_line_thickness(id, 3.0).unwrap();
    o.bounds();
    assert_eq!(o.bounds_recompute_count(), 1);

    o.remove_line(id).unwrap();
    assert!(o.bounds().is_empty());
    assert_eq!(o.bounds_recompute_count(), 2);
}

#[test]
fn point_property_changes_keep_bounds_cached() {
    let mut o = overlay();
    let id = o.add_point(point(5.0));
    let before = o.bounds();
    let recomputes = o.bounds_recompute_count();
    let bounds_dirty = o.listener().bounds_dirty_count();
    let render_dirty = o.listener().render_dirty_count();

    o.set_point_color(id, Color::RED).unwrap();
    o.set_point_size(id, 12.0).unwrap();
    assert_eq!(o.bounds(), before);
    assert_eq!(o.bounds_recompute_count(), recomputes);
    assert_eq!(o.listener().bounds_dirty_count(), bounds_dirty);
    assert_eq!(o.listener().render_dirty_count(), render_dirty + 2);

    o.remove_point(id).unwrap();
    assert!(o.bounds().is_empty());
    assert_eq!(o.bounds_recompute_count(), recomputes + 1);
}

// ---------------------------------------------------------------------------
// Hand-off and history
// ---------------------------------------------------------------------------

#[test]
fn render_data_crosses_threads() {
    let mut o = overlay();
    o.add_grid(Vec3::zeros(), 1.0, 1, Color::WHITE, 1.0);
    let handoff = Arc::new(RenderDataHandoff::new());
    let generation = handoff.publish(o.render_data());

    let reader = {
        let handoff = Arc::clone(&handoff);
        std::thread::spawn(move || handoff.take().map(|d| d.vertex_count()))
    };
    assert_eq!(reader.join().unwrap(), Some(6 * 4));
    assert_eq!(handoff.generation(), generation);
}

#[test]
fn undo_redo_round_trip_restores_render_data() {
    let mut o = overlay();
    let mut history = OverlayEditHistory::default();
    history.execute(OverlayEdit::add_line(line(0.0)), &mut o).unwrap();
    history.execute(OverlayEdit::add_triangle(tri(MAT_A, 0.0)), &mut o).unwrap();
    let before = o.build_render_data();

    history.undo(&mut o).unwrap();
    history.undo(&mut o).unwrap();
    assert!(o.is_empty());
    assert!(!history.can_undo());

    history.redo(&mut o).unwrap();
    history.redo(&mut o).unwrap();
    let after = o.build_render_data();
    assert_eq!(before, after);
    assert_eq!(
        history.undo_descriptions().collect::<Vec<_>>(),
        ["Add triangle", "Add line"]
    );
}
