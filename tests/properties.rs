use diagram_layout::{
    BoundingBox, Circle, LayoutConfig, Scene, Segment, SegmentStyle, Theme, Vector2,
    boxes_overlap, compute_layout, line_intersects_circle, point_in_box, render_svg,
    segments_intersect,
};
use proptest::prelude::*;

fn point() -> impl Strategy<Value = Vector2> {
    (-200i32..200, -200i32..200).prop_map(|(x, y)| Vector2::new(f64::from(x), f64::from(y)))
}

fn segment(id: &str, start: Vector2, end: Vector2) -> Segment {
    Segment::new(id, start, end, SegmentStyle::default()).expect("distinct endpoints")
}

proptest! {
    #[test]
    fn line_circle_test_ignores_direction(
        start in point(),
        end in point(),
        center in point(),
        radius in 0i32..120,
    ) {
        prop_assume!(start != end);
        let circle = Circle::new("c", center, f64::from(radius)).expect("valid circle");
        let forward = segment("s", start, end);
        let backward = segment("s", end, start);
        prop_assert_eq!(
            line_intersects_circle(&forward, &circle),
            line_intersects_circle(&backward, &circle)
        );
    }

    #[test]
    fn segment_crossing_is_symmetric(a0 in point(), a1 in point(), b0 in point(), b1 in point()) {
        prop_assume!(a0 != a1 && b0 != b1);
        let a = segment("a", a0, a1);
        let b = segment("b", b0, b1);
        prop_assert_eq!(segments_intersect(&a, &b), segments_intersect(&b, &a));
    }

    #[test]
    fn box_overlap_is_symmetric(
        a in (point(), 0i32..80, 0i32..80),
        b in (point(), 0i32..80, 0i32..80),
    ) {
        let a = BoundingBox::new(a.0.x, a.0.y, f64::from(a.1), f64::from(a.2)).unwrap();
        let b = BoundingBox::new(b.0.x, b.0.y, f64::from(b.1), f64::from(b.2)).unwrap();
        prop_assert_eq!(boxes_overlap(&a, &b), boxes_overlap(&b, &a));
    }

    #[test]
    fn construction_enforces_invariants(radius in -50i32..50, start in point(), end in point()) {
        let circle = Circle::new("c", Vector2::ZERO, f64::from(radius));
        prop_assert_eq!(circle.is_ok(), radius >= 0);
        let seg = Segment::new("s", start, end, SegmentStyle::default());
        prop_assert_eq!(seg.is_ok(), start != end);
    }

    #[test]
    fn labels_on_canvas_and_output_repeatable(
        circles in prop::collection::vec((20i32..380, 20i32..380, 1i32..25), 1..6),
    ) {
        let mut builder = Scene::builder(400.0, 400.0);
        for (idx, (x, y, r)) in circles.iter().enumerate() {
            let id = format!("c{idx}");
            builder = builder
                .circle(&id, (f64::from(*x), f64::from(*y)), f64::from(*r))
                .label(&id, &format!("q{idx}"));
        }
        let scene = builder.build().expect("valid scene");
        let theme = Theme::textbook();
        let config = LayoutConfig::default();

        let first = compute_layout(&scene, &theme, &config).expect("layout");
        let second = compute_layout(&scene, &theme, &config).expect("layout");
        prop_assert_eq!(render_svg(&first, &theme), render_svg(&second, &theme));

        let canvas = BoundingBox::new(0.0, 0.0, 400.0, 400.0).unwrap();
        for label in &first.labels {
            prop_assert!(point_in_box(label.position, &canvas));
        }
    }
}
