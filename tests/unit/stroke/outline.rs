use super::*;
use kurbo::Shape;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn approx_pt(a: Point, b: Point) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y)
}

#[test]
fn width_interpolates_between_ratios() {
    let opts = OutlineOpts::default();
    assert!(approx(opts.width_at(10.0, 0.0), 3.0));
    assert!(approx(opts.width_at(10.0, 1.0), 15.0));
    assert!(approx(opts.width_at(10.0, 0.5), 9.0));
    // Out-of-range pressure is clamped.
    assert!(approx(opts.width_at(10.0, 4.0), 15.0));
}

#[test]
fn straight_stroke_offsets_are_symmetric() {
    let opts = OutlineOpts::default();
    for p in [0.0f32, 0.25, 0.5, 1.0] {
        let pts = [Point::new(0.0, 0.0), Point::new(3.0, 4.0)];
        let out = build_outline(&pts, &[p, p], 8.0, &opts).unwrap();
        let expected = 8.0 * (0.3 + 1.2 * f64::from(p)) / 2.0;
        for i in 0..2 {
            assert!(approx(pts[i].distance(out.left[i]), expected));
            assert!(approx(pts[i].distance(out.right[i]), expected));
            assert!(approx(out.left[i].midpoint(out.right[i]).x, pts[i].x));
            assert!(approx(out.left[i].midpoint(out.right[i]).y, pts[i].y));
        }
    }
}

#[test]
fn horizontal_stroke_left_is_above() {
    let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
    let out = build_outline(&pts, &[0.5, 0.5], 10.0, &OutlineOpts::default()).unwrap();
    assert!(approx_pt(out.left[0], Point::new(0.0, -4.5)));
    assert!(approx_pt(out.right[0], Point::new(0.0, 4.5)));
    assert!(approx_pt(out.left[1], Point::new(10.0, -4.5)));
}

#[test]
fn fewer_than_two_points_is_empty() {
    let opts = OutlineOpts::default();
    assert!(build_outline(&[], &[], 5.0, &opts).unwrap().is_empty());
    let one = build_outline(&[Point::new(1.0, 1.0)], &[0.5], 5.0, &opts).unwrap();
    assert!(one.left.is_empty() && one.right.is_empty());
    assert!(one.to_path().elements().is_empty());
}

#[test]
fn missing_pressures_default_to_half() {
    let pts = [
        Point::new(0.0, 0.0),
        Point::new(5.0, 0.0),
        Point::new(10.0, 0.0),
    ];
    let opts = OutlineOpts::default();
    let explicit = build_outline(&pts, &[0.5, 0.5, 0.5], 6.0, &opts).unwrap();
    let implicit = build_outline(&pts, &[], 6.0, &opts).unwrap();
    assert_eq!(explicit, implicit);
}

#[test]
fn interior_vertices_use_central_difference() {
    // Right angle at (10,0): interior tangent is (10,10) -> 45 degrees.
    let pts = [
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
    ];
    let out = build_outline(&pts, &[1.0, 1.0, 1.0], 2.0, &OutlineOpts::default()).unwrap();
    let d = out.right[1] - pts[1];
    assert!(d.x < 0.0 && d.y > 0.0);
    assert!(approx(d.x.abs(), d.y.abs()));
    assert!(approx(d.hypot(), 1.5));
}

#[test]
fn coincident_points_fall_back_to_vertical_offset() {
    let pts = [Point::new(2.0, 2.0), Point::new(2.0, 2.0)];
    let out = build_outline(&pts, &[0.5, 0.5], 10.0, &OutlineOpts::default()).unwrap();
    assert!(approx_pt(out.left[0], Point::new(2.0, 2.0 - 4.5)));
    assert!(approx_pt(out.right[1], Point::new(2.0, 2.0 + 4.5)));
}

#[test]
fn invalid_parameters_are_rejected() {
    let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
    let opts = OutlineOpts::default();
    assert!(build_outline(&pts, &[], 0.0, &opts).is_err());
    assert!(build_outline(&pts, &[], f64::NAN, &opts).is_err());
    let bad = OutlineOpts {
        min_width_ratio: 2.0,
        max_width_ratio: 1.0,
        ..opts
    };
    assert!(build_outline(&pts, &[], 4.0, &bad).is_err());
}

#[test]
fn round_caps_extend_past_end_points() {
    let pts = [Point::new(10.0, 10.0), Point::new(30.0, 10.0)];
    let out = build_outline(&pts, &[0.5, 0.5], 10.0, &OutlineOpts::default()).unwrap();
    let path = out.to_path();
    let bbox = path.bounding_box();
    assert!((bbox.x0 - 5.5).abs() < 0.05);
    assert!((bbox.x1 - 34.5).abs() < 0.05);
    assert!(path.contains(Point::new(33.0, 10.0)));
    assert!(path.contains(Point::new(7.0, 10.0)));
    assert!(path.contains(Point::new(20.0, 13.0)));
    assert!(!path.contains(Point::new(20.0, 16.0)));
}

#[test]
fn butt_caps_stop_at_end_points() {
    let pts = [Point::new(10.0, 10.0), Point::new(30.0, 10.0)];
    let opts = OutlineOpts {
        line_cap: LineCap::Butt,
        ..OutlineOpts::default()
    };
    let out = build_outline(&pts, &[0.5, 0.5], 10.0, &opts).unwrap();
    assert!(out.end_cap().is_none());
    let path = out.to_path();
    let bbox = path.bounding_box();
    assert!(approx(bbox.x0, 10.0));
    assert!(approx(bbox.x1, 30.0));
    assert!(!path.contains(Point::new(33.0, 10.0)));
}

#[test]
fn end_cap_bulges_forward() {
    let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
    let out = build_outline(&pts, &[0.5, 0.5], 10.0, &OutlineOpts::default()).unwrap();
    let arc = out.end_cap().unwrap();
    let mid_angle = arc.start_angle + arc.sweep_angle / 2.0;
    assert!(approx(mid_angle.cos(), 1.0));
    let start = out.start_cap().unwrap();
    let mid_angle = start.start_angle + start.sweep_angle / 2.0;
    assert!(approx(mid_angle.cos(), -1.0));
}
