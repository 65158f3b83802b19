use super::*;

const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
const A: Rgba8 = Rgba8::new(10, 20, 30, 255);
const B: Rgba8 = Rgba8::new(200, 200, 200, 255);
const C: Rgb8 = Rgb8::new(0, 128, 255);

fn row(colors: &[Rgba8]) -> PixelBuffer {
    let bytes = colors.iter().flat_map(|c| c.to_array()).collect();
    PixelBuffer::from_rgba(colors.len() as u32, 1, bytes).unwrap()
}

#[test]
fn same_color_seed_is_noop() {
    let mut buf = PixelBuffer::filled(3, 3, RED);
    let before = buf.clone();
    let out = flood_fill(&mut buf, 1, 1, Rgb8::new(255, 0, 0)).unwrap();
    assert!(out.is_noop());
    assert!(out.mask.is_empty());
    assert_eq!(buf, before);
}

#[test]
fn translucent_seed_with_same_rgb_is_filled_opaque() {
    let mut buf = PixelBuffer::filled(2, 1, Rgba8::new(255, 0, 0, 128));
    let out = flood_fill(&mut buf, 0, 0, Rgb8::new(255, 0, 0)).unwrap();
    assert_eq!(out.filled_pixels, 2);
    assert_eq!(buf.get(1, 0).unwrap(), RED);
}

#[test]
fn row_fill_stops_at_barrier() {
    let mut buf = row(&[A, A, B, A, A]);
    let out = flood_fill(&mut buf, 0, 0, C).unwrap();
    assert_eq!(out.filled_pixels, 2);
    assert_eq!(out.spans, 1);
    let c = Rgba8::from(C);
    assert_eq!(buf, row(&[c, c, B, A, A]));
}

#[test]
fn out_of_bounds_seed_leaves_buffer_untouched() {
    let mut buf = PixelBuffer::filled(2, 2, A);
    let before = buf.clone();
    for (x, y) in [(-1, 0), (2, 0), (0, 2), (0, -5)] {
        let err = flood_fill(&mut buf, x, y, C).unwrap_err();
        assert!(err.is_out_of_bounds());
    }
    assert_eq!(buf, before);
}

/// 7x5 canvas split by a vertical wall at x=3 into two disjoint A regions.
fn walled() -> PixelBuffer {
    let mut buf = PixelBuffer::filled(7, 5, A);
    for y in 0..5 {
        buf.set(3, y, B).unwrap();
    }
    buf
}

#[test]
fn fill_is_contained_to_connected_region() {
    let mut buf = walled();
    let out = flood_fill(&mut buf, 0, 0, C).unwrap();
    assert_eq!(out.filled_pixels, 15);

    let c = Rgba8::from(C);
    for y in 0..5 {
        for x in 0..7 {
            let expected = match x {
                0..=2 => c,
                3 => B,
                _ => A,
            };
            assert_eq!(buf.get(x, y).unwrap(), expected, "({x},{y})");
            assert_eq!(out.mask.contains(x, y), x < 3);
        }
    }
}

#[test]
fn diagonal_neighbours_are_not_connected() {
    // A B
    // B A
    let mut buf = PixelBuffer::filled(2, 2, B);
    buf.set(0, 0, A).unwrap();
    buf.set(1, 1, A).unwrap();
    let out = flood_fill(&mut buf, 0, 0, C).unwrap();
    assert_eq!(out.filled_pixels, 1);
    assert_eq!(buf.get(1, 1).unwrap(), A);
}

#[test]
fn concave_region_is_filled_completely() {
    // U shape of A inside a B border; seed at the bottom of the U.
    let rows = [
        "BBBBBBB", //
        "BABBBAB", //
        "BABBBAB", //
        "BAAAAAB", //
        "BBBBBBB",
    ];
    let mut buf = PixelBuffer::filled(7, 5, B);
    for (y, r) in rows.iter().enumerate() {
        for (x, ch) in r.chars().enumerate() {
            if ch == 'A' {
                buf.set(x as i64, y as i64, A).unwrap();
            }
        }
    }
    let out = flood_fill(&mut buf, 3, 3, C).unwrap();
    assert_eq!(out.filled_pixels, 9);
    assert_eq!(buf.get(1, 1).unwrap(), Rgba8::from(C));
    assert_eq!(buf.get(5, 1).unwrap(), Rgba8::from(C));
    assert_eq!(buf.get(3, 1).unwrap(), B);
}

#[test]
fn spans_cover_region_once() {
    let mut buf = PixelBuffer::filled(16, 16, A);
    let out = flood_fill(&mut buf, 8, 8, C).unwrap();
    assert_eq!(out.filled_pixels, 256);
    assert_eq!(out.spans, 16);
    let mut rows: Vec<u32> = out.mask.spans().iter().map(|s| s.y).collect();
    rows.sort_unstable();
    rows.dedup();
    assert_eq!(rows.len(), 16);
}

#[test]
fn fill_is_deterministic() {
    let mut a = walled();
    let mut b = walled();
    flood_fill(&mut a, 5, 2, C).unwrap();
    flood_fill(&mut b, 5, 2, C).unwrap();
    assert_eq!(a, b);

    // A second identical fill is now a no-op.
    let snapshot = a.clone();
    let again = flood_fill(&mut a, 5, 2, C).unwrap();
    assert!(again.is_noop());
    assert_eq!(a, snapshot);
}

#[test]
fn cancelled_fill_does_not_modify_buffer() {
    let mut buf = walled();
    let before = buf.clone();
    let token = CancelToken::new();
    token.cancel();
    let out = flood_fill_cancellable(&mut buf, 0, 0, C, &token).unwrap();
    assert!(out.cancelled);
    assert_eq!(out.filled_pixels, 0);
    assert_eq!(buf, before);
}

#[test]
fn uncancelled_token_matches_plain_fill() {
    let mut a = walled();
    let mut b = walled();
    flood_fill(&mut a, 0, 4, C).unwrap();
    let out = flood_fill_cancellable(&mut b, 0, 4, C, &CancelToken::new()).unwrap();
    assert!(!out.cancelled);
    assert_eq!(a, b);
}

#[test]
fn region_preview_and_mask_apply() {
    let buf = walled();
    let mask = fill_region(&buf, 6, 0).unwrap();
    assert_eq!(mask.pixel_count(), 15);
    assert!(mask.contains(4, 4));
    assert!(!mask.contains(3, 4));

    let mut target = PixelBuffer::new(7, 5);
    mask.apply(&mut target, C).unwrap();
    assert_eq!(target.get(6, 4).unwrap(), Rgba8::from(C));
    assert_eq!(target.get(0, 0).unwrap(), Rgba8::TRANSPARENT);

    let mut wrong = PixelBuffer::new(3, 3);
    assert!(mask.apply(&mut wrong, C).is_err());
}
