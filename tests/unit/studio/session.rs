use super::*;
use crate::foundation::core::{Point, Rect, Rgb8, Rgba8};
use crate::scene::model::{BlendMode, Shape, ShapeGeometry, Stroke};

fn studio() -> Studio {
    Studio::new(StudioOpts {
        canvas: Canvas::new(8, 8).unwrap(),
        ..StudioOpts::default()
    })
    .unwrap()
}

fn first_layer(s: &Studio) -> LayerId {
    s.sequence().frames[0].layers[0].id
}

fn line() -> Stroke {
    Stroke::brush(
        vec![Point::new(1.0, 1.0), Point::new(6.0, 6.0)],
        Rgba8::BLACK,
        2.0,
    )
}

#[test]
fn frame_commands_keep_ids_unique_and_select_new_frame() {
    let mut s = studio();
    s.apply(Command::AddFrame { after: None }).unwrap();
    assert_eq!(s.active_frame(), 1);
    s.apply(Command::DuplicateFrame { index: 0 }).unwrap();
    assert_eq!(s.sequence().frame_count(), 3);
    assert_eq!(s.active_frame(), 1);
    s.sequence().validate().unwrap();

    s.apply(Command::DeleteFrame { index: 1 }).unwrap();
    s.apply(Command::DeleteFrame { index: 1 }).unwrap();
    assert_eq!(s.sequence().frame_count(), 1);
    assert!(s.apply(Command::DeleteFrame { index: 0 }).is_err());
}

#[test]
fn rejected_commands_change_nothing() {
    let mut s = studio();
    let before = s.sequence().clone();
    let layer = first_layer(&s);

    assert!(s.apply(Command::DeleteLayer { frame: 0, layer }).is_err());
    assert!(
        s.apply(Command::SetLayerOpacity {
            frame: 0,
            layer,
            opacity: 1.5
        })
        .is_err()
    );
    assert!(
        s.apply(Command::CommitStroke {
            frame: 0,
            layer,
            stroke: line().with_pressures(vec![0.1]),
        })
        .is_err()
    );
    assert!(
        s.apply(Command::Fill {
            frame: 0,
            layer,
            x: 8,
            y: 0,
            color: Rgb8::new(1, 2, 3),
        })
        .is_err()
    );
    assert!(s.apply(Command::SetFrameDuration { index: 3, ticks: 2 }).is_err());

    assert_eq!(s.sequence(), &before);
    assert!(!s.can_undo());
}

#[test]
fn layer_count_is_capped() {
    let mut s = studio();
    for _ in 1..MAX_LAYERS_PER_FRAME {
        s.apply(Command::AddLayer {
            frame: 0,
            name: None,
        })
        .unwrap();
    }
    assert_eq!(s.sequence().frames[0].layers.len(), MAX_LAYERS_PER_FRAME);
    assert_eq!(s.active_layer(), s.sequence().frames[0].layers[9].id);
    assert!(
        s.apply(Command::AddLayer {
            frame: 0,
            name: None
        })
        .is_err()
    );
}

#[test]
fn undo_redo_walks_stroke_history() {
    let mut s = studio();
    let layer = first_layer(&s);
    for _ in 0..2 {
        s.apply(Command::CommitStroke {
            frame: 0,
            layer,
            stroke: line(),
        })
        .unwrap();
    }
    assert_eq!(s.sequence().frames[0].layers[0].strokes.len(), 2);
    assert!(s.undo());
    assert_eq!(s.sequence().frames[0].layers[0].strokes.len(), 1);
    assert!(s.undo());
    assert!(!s.undo());
    assert!(s.redo());
    assert_eq!(s.sequence().frames[0].layers[0].strokes.len(), 1);
}

#[test]
fn fill_writes_region_into_raster_and_keeps_vectors() {
    let mut s = studio();
    let layer = first_layer(&s);
    let mut wall = PixelBuffer::new(8, 8);
    for y in 0..8 {
        wall.set(4, y, Rgba8::BLACK).unwrap();
    }
    s.apply(Command::ClearLayer { frame: 0, layer }).unwrap();
    let mut seq = s.into_sequence();
    seq.frames[0].layers[0].raster = Some(wall);
    seq.frames[0].layers[0].shapes.push(Shape {
        geometry: ShapeGeometry::Rect {
            rect: Rect::new(6.0, 0.0, 8.0, 2.0),
        },
        fill: Some(Rgba8::WHITE),
        outline: None,
    });
    let mut s = Studio::open(seq, StudioOpts::default()).unwrap();

    let red = Rgb8::new(255, 0, 0);
    s.apply(Command::Fill {
        frame: 0,
        layer,
        x: 0,
        y: 0,
        color: red,
    })
    .unwrap();

    let l = &s.sequence().frames[0].layers[0];
    let raster = l.raster.as_ref().unwrap();
    assert_eq!(raster.get(3, 7).unwrap(), Rgba8::new(255, 0, 0, 255));
    assert_eq!(raster.get(4, 3).unwrap(), Rgba8::BLACK);
    assert_eq!(raster.get(5, 5).unwrap(), Rgba8::TRANSPARENT);
    assert_eq!(l.shapes.len(), 1);

    // Same color again is a no-op and records no undo step.
    let depth = s.history.undo_depth();
    s.apply(Command::Fill {
        frame: 0,
        layer,
        x: 1,
        y: 1,
        color: red,
    })
    .unwrap();
    assert_eq!(s.history.undo_depth(), depth);
}

#[test]
fn fill_into_an_erased_gap_stays_visible() {
    let mut seq = studio().into_sequence();
    let layer = seq.frames[0].layers[0].id;
    {
        let l = &mut seq.frames[0].layers[0];
        l.raster = Some(PixelBuffer::filled(8, 8, Rgba8::WHITE));
        l.strokes.push(Stroke::eraser(
            vec![Point::new(0.0, 4.5), Point::new(8.0, 4.5)],
            2.0,
        ));
        l.strokes.push(Stroke::brush(
            vec![Point::new(7.5, 0.0), Point::new(7.5, 8.0)],
            Rgba8::BLACK,
            1.0,
        ));
    }
    let mut s = Studio::open(seq, StudioOpts::default()).unwrap();
    assert_eq!(s.render_frame(0).unwrap().get(3, 4).unwrap(), Rgba8::TRANSPARENT);

    s.apply(Command::Fill {
        frame: 0,
        layer,
        x: 3,
        y: 4,
        color: Rgb8::new(255, 0, 0),
    })
    .unwrap();

    let flat = s.render_frame(0).unwrap();
    assert_eq!(flat.get(3, 4).unwrap(), Rgba8::new(255, 0, 0, 255));
    assert_eq!(flat.get(3, 1).unwrap(), Rgba8::WHITE);
    // The eraser is baked into the raster; later strokes stay editable.
    let l = &s.sequence().frames[0].layers[0];
    assert_eq!(l.strokes.len(), 1);
    assert_eq!(l.strokes[0].tool, ToolKind::Brush);

    assert!(s.undo());
    assert_eq!(s.sequence().frames[0].layers[0].strokes.len(), 2);
}

#[test]
fn merge_down_bakes_both_layers() {
    let mut s = studio();
    let bottom = first_layer(&s);
    s.apply(Command::AddLayer {
        frame: 0,
        name: Some("ink".into()),
    })
    .unwrap();
    let top = s.active_layer();
    s.apply(Command::AddShape {
        frame: 0,
        layer: bottom,
        shape: Shape {
            geometry: ShapeGeometry::Rect {
                rect: Rect::new(0.0, 0.0, 8.0, 8.0),
            },
            fill: Some(Rgba8::WHITE),
            outline: None,
        },
    })
    .unwrap();
    s.apply(Command::AddShape {
        frame: 0,
        layer: top,
        shape: Shape {
            geometry: ShapeGeometry::Rect {
                rect: Rect::new(0.0, 0.0, 4.0, 8.0),
            },
            fill: Some(Rgba8::new(0, 0, 255, 255)),
            outline: None,
        },
    })
    .unwrap();
    s.apply(Command::SetBlendMode {
        frame: 0,
        layer: top,
        mode: BlendMode::Multiply,
    })
    .unwrap();

    let flattened = s.render_frame(0).unwrap();
    s.apply(Command::MergeLayerDown {
        frame: 0,
        layer: top,
    })
    .unwrap();

    let f = &s.sequence().frames[0];
    assert_eq!(f.layers.len(), 1);
    assert!(f.layers[0].shapes.is_empty());
    assert_eq!(f.layers[0].raster.as_ref(), Some(&flattened));
    assert_eq!(s.active_layer(), bottom);
    assert!(
        s.apply(Command::MergeLayerDown {
            frame: 0,
            layer: bottom
        })
        .is_err()
    );
}

#[test]
fn move_and_rename_layers() {
    let mut s = studio();
    let a = first_layer(&s);
    s.apply(Command::AddLayer {
        frame: 0,
        name: None,
    })
    .unwrap();
    s.apply(Command::MoveLayer {
        frame: 0,
        layer: a,
        to: 1,
    })
    .unwrap();
    assert_eq!(s.sequence().frames[0].layers[1].id, a);
    assert!(
        s.apply(Command::MoveLayer {
            frame: 0,
            layer: a,
            to: 2
        })
        .is_err()
    );
    s.apply(Command::RenameLayer {
        frame: 0,
        layer: a,
        name: "  lines ".into(),
    })
    .unwrap();
    assert_eq!(s.sequence().frames[0].layers[1].name, "lines");
}

#[test]
fn playback_follows_frame_durations() {
    let mut s = studio();
    s.apply(Command::SetFps {
        fps: Fps::new(20).unwrap(),
    })
    .unwrap();
    s.apply(Command::SetFrameDuration { index: 0, ticks: 2 }).unwrap();
    s.apply(Command::AddFrame { after: None }).unwrap();
    s.apply(Command::AddFrame { after: None }).unwrap();
    s.apply(Command::SetFrameDuration { index: 2, ticks: 3 }).unwrap();
    s.select_frame(0).unwrap();

    assert_eq!(s.play(49.0), 0);
    assert_eq!(s.play(1.0), 0);
    assert_eq!(s.sequencer().tick_within_frame(), 1);
    assert_eq!(s.play(50.0), 1);
    assert_eq!(s.play(50.0), 2);
    assert_eq!(s.sequence().playhead_tick, 3);
    assert_eq!(s.play(150.0), 0);
    assert_eq!(s.sequencer().tick_within_frame(), 0);
}

#[test]
fn selecting_unknown_targets_fails() {
    let mut s = studio();
    assert!(s.select_frame(1).is_err());
    assert!(s.select_layer(LayerId(99)).is_err());
    s.select_layer(first_layer(&s)).unwrap();
}
