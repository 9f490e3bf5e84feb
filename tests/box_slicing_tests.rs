mod support;

use globe_slicer::{
    config::SlicerConfig,
    float_types::Real,
    geodesy::height_of,
    scene::{Scene, TilesetId},
    slicer::{
        SliceOptions, SliceType, SlicingBox, SlicingTool,
        arrows::{HandleSide, ground_axis},
        slicing_box::SidePlanes,
    },
};
use nalgebra::{Point3, Vector3};
use support::{MockView, approx_eq, ground, points_approx_eq, scene_with_tilesets};

fn box_corners() -> Vec<Point3<Real>> {
    vec![
        ground(8.02, 46.49, 0.0),
        ground(7.98, 46.51, 0.0),
        ground(7.98, 46.49, 0.0),
        ground(8.02, 46.51, 0.0),
    ]
}

fn activate(options: SliceOptions, view: &MockView, scene: &mut Scene) -> SlicingBox {
    let mut options = options;
    SlicingBox::activate(&mut options, &SlicerConfig::default(), view, scene).unwrap()
}

fn explicit_box(negate: bool) -> SliceOptions {
    SliceOptions::new(SliceType::Box)
        .with_points(box_corners())
        .with_limits(-500.0, 1000.0)
        .negated(negate)
}

fn assert_clipping(scene: &Scene, point: &Point3<Real>, clipped: bool) {
    assert_eq!(scene.globe.is_point_clipped(point), clipped, "globe at {point}");
    for tileset in &scene.tilesets {
        assert_eq!(tileset.is_point_clipped(point), clipped, "tileset {} at {point}", tileset.id().0);
    }
    for voxel in &scene.voxels {
        assert_eq!(voxel.is_point_clipped(point), clipped, "voxel {} at {point}", voxel.id().0);
    }
}

fn assert_footprint_consistent(tool: &SlicingBox) {
    let bbox = tool.bbox();
    let c = &bbox.corners;
    assert!(approx_eq(bbox.width, nalgebra::distance(&c.top_left, &c.bottom_left), 1e-4));
    assert!(approx_eq(bbox.length, nalgebra::distance(&c.bottom_right, &c.bottom_left), 1e-4));
    assert!(bbox.height >= 450.0);

    let planes = SidePlanes::from_corners(c, false);
    for (plane, corners) in [
        (planes.left, [c.bottom_right, c.top_right]),
        (planes.right, [c.bottom_left, c.top_left]),
        (planes.back, [c.top_left, c.top_right]),
        (planes.front, [c.bottom_left, c.bottom_right]),
    ] {
        for corner in corners {
            assert!(plane.point_distance(&corner) > -1e-3, "edge crossed its opposite");
        }
    }
}

#[test]
fn corners_are_classified_regardless_of_order() {
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let tool = activate(explicit_box(false), &view, &mut scene);
    let corners = &tool.bbox().corners;
    assert!(points_approx_eq(&corners.bottom_left, &ground(7.98, 46.49, 0.0), 1e-4));
    assert!(points_approx_eq(&corners.bottom_right, &ground(8.02, 46.49, 0.0), 1e-4));
    assert!(points_approx_eq(&corners.top_left, &ground(7.98, 46.51, 0.0), 1e-4));
    assert!(points_approx_eq(&corners.top_right, &ground(8.02, 46.51, 0.0), 1e-4));
    assert!(approx_eq(tool.bbox().lower_limit, -500.0, 1e-4));
    assert!(approx_eq(height_of(&tool.bbox().center), 0.0, 1e-4));
}

#[test]
fn keeps_the_inside_and_clips_the_outside() {
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let _tool = activate(explicit_box(false), &view, &mut scene);

    for inside in [ground(8.0, 46.5, 0.0), ground(8.01, 46.505, 300.0), ground(7.99, 46.495, -300.0)] {
        assert_clipping(&scene, &inside, false);
    }
    for outside in [
        ground(8.05, 46.5, 0.0),
        ground(7.95, 46.5, 0.0),
        ground(8.0, 46.48, 0.0),
        ground(8.0, 46.52, 0.0),
        ground(8.0, 46.5, 800.0),
        ground(8.0, 46.5, -800.0),
    ] {
        assert_clipping(&scene, &outside, true);
    }
}

#[test]
fn negate_flips_the_kept_side() {
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let tool = activate(explicit_box(true), &view, &mut scene);

    assert_clipping(&scene, &ground(8.0, 46.5, 0.0), true);
    assert_clipping(&scene, &ground(8.05, 46.5, 0.0), false);
    assert_clipping(&scene, &ground(8.0, 46.48, 0.0), false);
    // a negated box has no vertical extent
    assert_eq!(scene.globe.clipping_planes.as_ref().map(|c| c.len()), Some(4));
    assert_eq!(scene.voxels[0].clipping_planes.as_ref().map(|c| c.len()), Some(4));
    assert_eq!(tool.arrows().arrows_list().len(), 4);
}

#[test]
fn plane_counts_and_union_mode() {
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let tool = activate(explicit_box(false), &view, &mut scene);

    let globe = scene.globe.clipping_planes.as_ref().unwrap();
    assert_eq!(globe.len(), 6);
    assert!(globe.union_clipping_regions);
    for tileset in &scene.tilesets {
        assert_eq!(tileset.clipping_planes.as_ref().map(|c| c.len()), Some(6));
    }
    for voxel in &scene.voxels {
        let planes = voxel.clipping_planes.as_ref().unwrap();
        assert_eq!(planes.len(), 6);
        assert!(planes.union_clipping_regions);
    }
    assert_eq!(tool.cached_tilesets(), 3);
    assert_eq!(scene.entities.handles.len(), 6);
    assert!(scene.entities.box_volume.is_some());
}

#[test]
fn zero_move_changes_nothing() {
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let mut tool = activate(explicit_box(false), &view, &mut scene);
    let before = tool.bbox().clone();

    for side in [HandleSide::Left, HandleSide::Right, HandleSide::Back, HandleSide::Front, HandleSide::Down, HandleSide::Up] {
        tool.on_plane_move(side, 0.0, Vector3::zeros(), &view, &mut scene);
    }
    let after = tool.bbox();
    for (a, b) in before.corners.to_array().iter().zip(after.corners.to_array().iter()) {
        assert!(points_approx_eq(a, b, 1e-4));
    }
    assert!(approx_eq(before.height, after.height, 1e-9));
    assert!(approx_eq(before.lower_limit, after.lower_limit, 1e-9));
    assert!(points_approx_eq(&before.center, &after.center, 1e-4));
}

#[test]
fn side_moves_keep_the_footprint_valid() {
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let mut tool = activate(explicit_box(false), &view, &mut scene);

    let moves: [(HandleSide, Real); 8] = [
        (HandleSide::Left, 1_000.0),
        (HandleSide::Right, -2_500.0),
        (HandleSide::Back, 25_000.0),
        (HandleSide::Front, 300.0),
        (HandleSide::Right, 10_000.0),
        (HandleSide::Left, -800.0),
        (HandleSide::Front, 2_000.0),
        (HandleSide::Back, -1_200.0),
    ];
    for (side, amount) in moves {
        let axis = ground_axis(side, &tool.bbox().corners).unwrap();
        tool.on_plane_move(side, amount, axis * amount, &view, &mut scene);
        assert_footprint_consistent(&tool);
    }
}

#[test]
fn inward_move_below_min_size_pushes_the_opposite_edge() {
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let mut tool = activate(explicit_box(false), &view, &mut scene);
    let length = tool.bbox().length;

    let amount = length - 100.0;
    let axis = ground_axis(HandleSide::Left, &tool.bbox().corners).unwrap();
    tool.on_plane_move(HandleSide::Left, amount, axis * amount, &view, &mut scene);

    assert!(approx_eq(tool.bbox().length, length, 1.0));
    assert_footprint_consistent(&tool);
}

#[test]
fn outward_move_widens_the_box() {
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let mut tool = activate(explicit_box(false), &view, &mut scene);
    let width = tool.bbox().width;

    let axis = ground_axis(HandleSide::Back, &tool.bbox().corners).unwrap();
    tool.on_plane_move(HandleSide::Back, -500.0, axis * -500.0, &view, &mut scene);

    assert!(approx_eq(tool.bbox().width, width + 500.0, 1.0));
    // the southern strip is inside now
    assert_clipping(&scene, &ground(8.0, 46.4875, 0.0), false);
}

#[test]
fn vertical_moves_respect_min_height() {
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let mut tool = activate(explicit_box(false), &view, &mut scene);

    // drag the bottom down by 300 m
    tool.on_plane_move(HandleSide::Down, 300.0, Vector3::zeros(), &view, &mut scene);
    assert!(approx_eq(tool.bbox().height, 1_300.0, 1e-9));
    assert!(approx_eq(tool.bbox().lower_limit, -800.0, 1e-9));

    // drag the top down by 600 m
    tool.on_plane_move(HandleSide::Up, 600.0, Vector3::zeros(), &view, &mut scene);
    assert!(approx_eq(tool.bbox().height, 700.0, 1e-9));
    assert!(approx_eq(tool.bbox().lower_limit, -800.0, 1e-9));

    // too thin: the whole box goes down instead
    tool.on_plane_move(HandleSide::Up, 600.0, Vector3::zeros(), &view, &mut scene);
    assert!(approx_eq(tool.bbox().height, 700.0, 1e-9));
    assert!(approx_eq(tool.bbox().lower_limit, -1_400.0, 1e-9));

    // same for the bottom dragged up
    tool.on_plane_move(HandleSide::Down, -400.0, Vector3::zeros(), &view, &mut scene);
    assert!(approx_eq(tool.bbox().height, 700.0, 1e-9));
    assert!(approx_eq(tool.bbox().lower_limit, -1_000.0, 1e-9));

    assert!(approx_eq(height_of(&tool.bbox().center), -650.0, 1e-4));
    assert_clipping(&scene, &ground(8.0, 46.5, -990.0), false);
    assert_clipping(&scene, &ground(8.0, 46.5, -1_010.0), true);
    assert_clipping(&scene, &ground(8.0, 46.5, -290.0), true);
}

#[test]
fn slice_info_round_trips_through_options() {
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2).with_terrain(250.0);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let first = activate(SliceOptions::new(SliceType::ViewBox), &view, &mut scene);
    let info = first.box_slice_info();
    first.deactivate(&mut scene);

    let mut scene = scene_with_tilesets(8.0, 46.5);
    let second = activate(SliceOptions::from(&info), &view, &mut scene);

    let b = second.bbox();
    for (p, q) in info.slice_points.iter().zip(b.corners.to_array().iter()) {
        assert!(points_approx_eq(p, q, 1e-4));
    }
    assert!(approx_eq(info.height, b.height, 1e-4));
    assert!(approx_eq(info.lower_limit + 250.0, b.lower_limit, 1e-4));
    assert_eq!(second.box_slice_info().slice_points.len(), 4);
}

#[test]
fn slice_info_follows_the_terrain_under_a_moved_box() {
    // 10 m of terrain rise per 0.001 degree east
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2).with_sloped_terrain(500.0, 10_000.0);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let mut tool = activate(explicit_box(false), &view, &mut scene);
    assert!(approx_eq(tool.bbox().lower_limit, 0.0, 1e-4));

    let axis = ground_axis(HandleSide::Left, &tool.bbox().corners).unwrap();
    tool.on_plane_move(HandleSide::Left, -2_000.0, axis * -2_000.0, &view, &mut scene);
    let bottom = tool.bbox().lower_limit;
    let height = tool.bbox().height;
    let info = tool.box_slice_info();
    // the footprint center moved west, onto lower terrain
    assert!(info.lower_limit > -400.0 && info.lower_limit < -300.0, "lower limit {}", info.lower_limit);
    tool.deactivate(&mut scene);

    let mut scene = scene_with_tilesets(8.0, 46.5);
    let restored = activate(SliceOptions::from(&info), &view, &mut scene);
    assert!(approx_eq(restored.bbox().lower_limit, bottom, 1e-3));
    assert!(approx_eq(restored.bbox().height, height, 1e-6));
    assert!(approx_eq(height_of(&restored.bbox().center), bottom + height / 2.0, 1e-3));
}

#[test]
fn late_tileset_is_clipped_once_loaded() {
    use globe_slicer::float_types::parry3d::bounding_volume::BoundingSphere;
    use globe_slicer::scene::Tileset;
    use nalgebra::Matrix4;

    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    scene.add_tileset(Tileset::new(TilesetId(4)));
    let mut tool = activate(explicit_box(false), &view, &mut scene);
    assert!(scene.tileset(TilesetId(4)).unwrap().clipping_planes.is_none());

    tool.add_clipping_planes(TilesetId(4), &mut scene);
    assert!(scene.tileset(TilesetId(4)).unwrap().clipping_planes.is_none());

    let center = ground(8.01, 46.5, 100.0);
    scene
        .tileset_mut(TilesetId(4))
        .unwrap()
        .load(Matrix4::identity(), BoundingSphere::new(center, 500.0));
    tool.add_clipping_planes(TilesetId(4), &mut scene);

    let late = scene.tileset(TilesetId(4)).unwrap();
    assert_eq!(late.clipping_planes.as_ref().map(|c| c.len()), Some(6));
    assert!(!late.is_point_clipped(&ground(8.0, 46.5, 0.0)));
    assert!(late.is_point_clipped(&ground(8.05, 46.5, 0.0)));
}

#[test]
fn box_visibility_leaves_clipping_alone() {
    let view = MockView::looking_at(8.0, 46.5, 0.3, 0.2);
    let mut scene = scene_with_tilesets(8.0, 46.5);
    let mut tool = activate(explicit_box(false), &view, &mut scene);
    let planes = scene.globe.clipping_planes.clone();

    tool.toggle_box_visibility(false, &mut scene);
    assert!(!tool.show_box());
    assert_eq!(scene.entities.box_volume.as_ref().map(|v| v.show), Some(false));
    assert!(scene.entities.handles.iter().all(|h| !h.show));
    assert_eq!(scene.globe.clipping_planes, planes);
    assert!(!tool.box_slice_info().show_box);

    tool.toggle_box_visibility(true, &mut scene);
    tool.on_exaggeration_changed(2.0, &mut scene);
    assert!(scene.entities.handles.iter().all(|h| !h.show));
    tool.on_exaggeration_changed(1.0, &mut scene);
    assert!(scene.entities.handles.iter().all(|h| h.show));
}
