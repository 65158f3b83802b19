use super::*;
use crate::foundation::core::{LayerId, Rect, Rgba8};
use crate::scene::model::{Shape, ShapeGeometry, ShapeOutline, Stroke};

fn layer() -> Layer {
    let mut layer = Layer::new(LayerId(1), "hit");
    layer.strokes.push(Stroke::brush(
        vec![Point::new(0.0, 10.0), Point::new(40.0, 10.0)],
        Rgba8::BLACK,
        4.0,
    ));
    layer.shapes.push(Shape {
        geometry: ShapeGeometry::Rect {
            rect: Rect::new(20.0, 0.0, 30.0, 30.0),
        },
        fill: Some(Rgba8::WHITE),
        outline: None,
    });
    layer
}

#[test]
fn shapes_win_over_strokes() {
    let opts = OutlineOpts::default();
    let l = layer();
    assert_eq!(
        hit_test_layer(&l, Point::new(25.0, 10.0), &opts),
        Some(HitTarget::Shape(0))
    );
    assert_eq!(
        hit_test_layer(&l, Point::new(5.0, 10.0), &opts),
        Some(HitTarget::Stroke(0))
    );
    assert_eq!(hit_test_layer(&l, Point::new(5.0, 25.0), &opts), None);
}

#[test]
fn outline_only_shapes_hit_on_their_edge() {
    let mut l = Layer::new(LayerId(1), "ring");
    l.shapes.push(Shape {
        geometry: ShapeGeometry::Rect {
            rect: Rect::new(0.0, 0.0, 20.0, 20.0),
        },
        fill: None,
        outline: Some(ShapeOutline {
            color: Rgba8::BLACK,
            width: 2.0,
        }),
    });
    let opts = OutlineOpts::default();
    assert_eq!(
        hit_test_layer(&l, Point::new(0.5, 10.0), &opts),
        Some(HitTarget::Shape(0))
    );
    assert_eq!(hit_test_layer(&l, Point::new(10.0, 10.0), &opts), None);
}

#[test]
fn erasers_never_hit() {
    let mut l = Layer::new(LayerId(1), "erase");
    l.strokes.push(Stroke::eraser(
        vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        6.0,
    ));
    assert_eq!(
        hit_test_layer(&l, Point::new(5.0, 0.0), &OutlineOpts::default()),
        None
    );
}
