use super::*;

#[test]
fn six_ticks_over_2_1_3_wrap_to_start() {
    let mut s = FrameSequencer::new(&[2, 1, 3]).unwrap();
    let seen: Vec<usize> = (0..6).map(|_| s.tick()).collect();
    assert_eq!(seen, vec![0, 1, 2, 2, 2, 0]);
    assert_eq!(s.active_index(), 0);
    assert_eq!(s.tick_within_frame(), 0);
    assert_eq!(s.total_duration_ticks(), 6);
}

#[test]
fn frame_start_ticks_are_prefix_sums() {
    let s = FrameSequencer::new(&[2, 1, 3]).unwrap();
    assert_eq!(s.frame_start_tick(0), Some(0));
    assert_eq!(s.frame_start_tick(1), Some(2));
    assert_eq!(s.frame_start_tick(2), Some(3));
    assert_eq!(s.frame_start_tick(3), Some(6));
    assert_eq!(s.frame_start_tick(4), None);
}

#[test]
fn frame_at_tick_resolves_cumulative_durations() {
    let s = FrameSequencer::new(&[2, 1, 3]).unwrap();
    let got: Vec<(usize, u32)> = (0..7).map(|t| s.frame_at_tick(t)).collect();
    assert_eq!(
        got,
        vec![(0, 0), (0, 1), (1, 0), (2, 0), (2, 1), (2, 2), (0, 0)]
    );
}

#[test]
fn advance_matches_repeated_ticks() {
    let mut a = FrameSequencer::new(&[3, 1, 2, 4]).unwrap();
    let mut b = a.clone();
    for n in [1u64, 5, 9, 23, 0, 2] {
        a.advance(n);
        for _ in 0..n {
            b.tick();
        }
        assert_eq!(a, b);
        assert_eq!(a.playhead_tick(), a.frame_start_tick(a.active_index()).unwrap() + u64::from(a.tick_within_frame()));
    }
}

#[test]
fn select_frame_resets_tick_counter() {
    let mut s = FrameSequencer::new(&[4, 4]).unwrap();
    s.advance(2);
    assert_eq!(s.tick_within_frame(), 2);
    s.select_frame(1).unwrap();
    assert_eq!((s.active_index(), s.tick_within_frame()), (1, 0));
    assert_eq!(s.playhead_tick(), 4);
    assert!(s.select_frame(2).is_err());
}

#[test]
fn empty_or_zero_durations_are_rejected() {
    assert!(FrameSequencer::new(&[]).is_err());
    assert!(FrameSequencer::new(&[1, 0]).is_err());
}

#[test]
fn set_durations_clamps_position() {
    let mut s = FrameSequencer::new(&[1, 1, 5]).unwrap();
    s.seek_tick(5);
    assert_eq!((s.active_index(), s.tick_within_frame()), (2, 3));
    s.set_durations(&[2, 2]).unwrap();
    assert_eq!((s.active_index(), s.tick_within_frame()), (1, 1));
    assert!(s.set_durations(&[]).is_err());
}
