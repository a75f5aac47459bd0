//! Integration tests: pointer gestures routed through the board.
//!
//! Exercises drag/resize sessions end to end (press → global moves →
//! release), subscription bookkeeping, and the resulting persisted state.

use pretty_assertions::assert_eq;
use sticky_core::config::STORAGE_KEY;
use sticky_core::{
    BoardConfig, ManualClock, MemoryStorage, NoteId, NotePatch, Position, ResizeDirection, Size,
    Viewport,
};
use sticky_editor::{Board, PointerEvent};

const VIEWPORT: Viewport = Viewport {
    width: 1600,
    height: 1000,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn loaded_board() -> (Board<MemoryStorage>, ManualClock) {
    init_logging();
    let clock = ManualClock::new(1_700_000_000_000);
    let mut board = Board::with_config(MemoryStorage::new(), BoardConfig::default(), clock.clone());
    board.load();
    (board, clock)
}

/// A board holding one note at (300, 400) sized 300×250.
fn board_with_note() -> (Board<MemoryStorage>, ManualClock, NoteId) {
    let (mut board, clock) = loaded_board();
    let id = board.create_note(VIEWPORT);
    board.update_note(id, NotePatch::position(Position::new(300, 400)));
    (board, clock, id)
}

// ─── Drag ───────────────────────────────────────────────────────────────

#[test]
fn drag_session_moves_note_and_releases_listener() {
    let (mut board, _, id) = board_with_note();
    let mut press = PointerEvent::new(350, 410);

    assert!(board.drag_start(id, &mut press));
    assert!(press.default_prevented() && press.propagation_stopped());
    assert_eq!(board.hub().active_count(), 1);
    assert!(board.is_interacting());

    assert!(board.pointer_move(550, 610));
    assert_eq!(board.note(id).unwrap().position, Position::new(500, 600));

    assert!(board.pointer_move(850, 710));
    assert_eq!(board.note(id).unwrap().position, Position::new(800, 700));

    board.pointer_up(850, 710);
    assert_eq!(board.hub().active_count(), 0);
    assert!(!board.is_interacting());

    // Moves after release change nothing.
    assert!(!board.pointer_move(0, 0));
    assert_eq!(board.note(id).unwrap().position, Position::new(800, 700));
}

#[test]
fn drag_start_brings_note_to_front() {
    let (mut board, _, first) = board_with_note();
    let second = board.create_note(VIEWPORT);
    assert!(board.note(second).unwrap().z_index > board.note(first).unwrap().z_index);

    board.drag_start(first, &mut PointerEvent::new(300, 400));
    assert!(board.note(first).unwrap().z_index > board.note(second).unwrap().z_index);
    assert_eq!(board.note(first).unwrap().z_index, board.max_z_index());
}

#[test]
fn drag_positions_are_never_negative() {
    let (mut board, _, id) = board_with_note();
    board.drag_start(id, &mut PointerEvent::new(400, 500));
    for (x, y) in [(-500, -500), (0, 2_000), (3_000, -1), (99, 99)] {
        board.pointer_move(x, y);
        let pos = board.note(id).unwrap().position;
        assert!(pos.x >= 0 && pos.y >= 0, "({x}, {y}) → {pos:?}");
    }
    board.pointer_up(0, 0);
}

#[test]
fn drag_into_toolbar_is_deflected_right() {
    let (mut board, _, id) = board_with_note();
    board.drag_start(id, &mut PointerEvent::new(300, 400));

    board.pointer_move(120, 90);
    assert_eq!(board.note(id).unwrap().position, Position::new(280, 90));

    // Below the toolbar the note may reach the left edge.
    board.pointer_move(0, 400);
    assert_eq!(board.note(id).unwrap().position, Position::new(0, 400));
    board.pointer_up(0, 400);
}

// ─── Resize ─────────────────────────────────────────────────────────────

#[test]
fn resize_se_scenario() {
    let (mut board, _, id) = board_with_note();
    assert!(board.resize_start(id, &mut PointerEvent::new(600, 650), ResizeDirection::Se));
    board.pointer_move(700, 750);

    let note = board.note(id).unwrap();
    assert_eq!(note.size, Size::new(400, 350));
    assert_eq!(note.position, Position::new(300, 400));
    board.pointer_up(700, 750);
    assert_eq!(board.hub().active_count(), 0);
}

#[test]
fn resize_nw_scenario() {
    let (mut board, _, id) = board_with_note();
    board.resize_start(id, &mut PointerEvent::new(300, 400), ResizeDirection::Nw);
    board.pointer_move(250, 350);

    let note = board.note(id).unwrap();
    assert_eq!(note.size, Size::new(350, 300));
    assert_eq!(note.position, Position::new(250, 350));
    board.pointer_up(250, 350);
}

#[test]
fn consecutive_moves_keep_opposite_edge_anchored() {
    let (mut board, _, id) = board_with_note();
    board.resize_start(id, &mut PointerEvent::new(300, 500), ResizeDirection::W);

    // Right edge sits at 600 and must stay there through every move,
    // including ones that hit the min/max limits.
    for x in [250, 200, 500, 580, -400, 100] {
        board.pointer_move(x, 500);
        let note = board.note(id).unwrap();
        assert_eq!(note.position.x + note.size.width, 600, "pointer x = {x}");
        assert!((150..=600).contains(&note.size.width));
    }
    board.pointer_up(100, 500);
}

#[test]
fn every_direction_stays_within_limits() {
    for direction in ResizeDirection::ALL {
        let (mut board, _, id) = board_with_note();
        board.resize_start(id, &mut PointerEvent::new(0, 0), direction);
        for (x, y) in [(-5_000, -5_000), (5_000, 5_000), (301, 401), (5_000, -5_000)] {
            board.pointer_move(x, y);
            let size = board.note(id).unwrap().size;
            assert!(
                (150..=600).contains(&size.width) && (150..=600).contains(&size.height),
                "{direction} ({x}, {y}) → {size:?}"
            );
        }
        board.pointer_up(0, 0);
        assert_eq!(board.hub().active_count(), 0, "{direction} leaked a listener");
    }
}

#[test]
fn far_away_note_resizes_and_drags_without_overflow() {
    init_logging();
    let clock = ManualClock::new(1_700_000_000_000);
    let far = i32::MAX - 100;
    let stored = format!(
        r#"[{{"id":"note-far","position":{{"x":{far},"y":{far}}},"size":{{"width":300,"height":250}},"text":"","color":"blue","zIndex":1,"isMinimized":false,"createdAt":0,"updatedAt":0}}]"#
    );
    let backend = MemoryStorage::new().with_item(STORAGE_KEY, &stored);
    let mut board = Board::with_config(backend, BoardConfig::default(), clock.clone());
    board.load();
    let id = NoteId::from("note-far");

    assert!(board.resize_start(id, &mut PointerEvent::new(far, far), ResizeDirection::W));
    board.pointer_move(0, 0);
    let note = board.note(id).unwrap();
    assert_eq!(note.size.width, 600);
    assert_eq!(note.position.x, i32::MAX - 600);
    board.pointer_up(0, 0);

    board.drag_start(id, &mut PointerEvent::new(0, 0));
    board.pointer_move(i32::MAX, i32::MAX);
    assert_eq!(board.note(id).unwrap().position.x, i32::MAX);
    board.pointer_up(0, 0);
}

// ─── Gesture switching ──────────────────────────────────────────────────

#[test]
fn resize_start_ends_drag_of_same_note() {
    let (mut board, _, id) = board_with_note();
    board.drag_start(id, &mut PointerEvent::new(300, 400));
    board.resize_start(id, &mut PointerEvent::new(600, 650), ResizeDirection::Se);
    assert_eq!(board.hub().active_count(), 1);

    board.pointer_move(700, 750);
    let note = board.note(id).unwrap();
    assert_eq!(note.size, Size::new(400, 350));
    assert_eq!(note.position, Position::new(300, 400));
    board.pointer_up(700, 750);
    assert_eq!(board.hub().active_count(), 0);
}

#[test]
fn drag_start_ends_resize_of_same_note() {
    let (mut board, _, id) = board_with_note();
    board.resize_start(id, &mut PointerEvent::new(300, 400), ResizeDirection::Nw);
    board.drag_start(id, &mut PointerEvent::new(350, 410));
    assert_eq!(board.hub().active_count(), 1);

    board.pointer_move(550, 610);
    let note = board.note(id).unwrap();
    assert_eq!(note.position, Position::new(500, 600));
    assert_eq!(note.size, Size::new(300, 250));
    board.pointer_up(550, 610);
}

// ─── Subscription lifecycle ─────────────────────────────────────────────

#[test]
fn deleting_a_note_mid_drag_releases_listener() {
    let (mut board, _, id) = board_with_note();
    board.drag_start(id, &mut PointerEvent::new(300, 400));
    assert_eq!(board.hub().active_count(), 1);

    board.delete_note(id);
    assert_eq!(board.hub().active_count(), 0);
    assert!(!board.pointer_move(500, 500));
}

#[test]
fn teardown_releases_every_listener() {
    let (mut board, _, a) = board_with_note();
    let b = board.create_note(VIEWPORT);
    board.drag_start(a, &mut PointerEvent::new(300, 400));
    board.resize_start(b, &mut PointerEvent::new(0, 0), ResizeDirection::E);
    assert_eq!(board.hub().active_count(), 2);

    board.teardown();
    assert_eq!(board.hub().active_count(), 0);
    assert_eq!(board.next_deadline(), None);
}

#[test]
fn subscribing_only_during_gestures() {
    let (mut board, _, id) = board_with_note();
    assert_eq!(board.hub().active_count(), 0);
    for _ in 0..3 {
        board.drag_start(id, &mut PointerEvent::new(300, 400));
        board.pointer_move(400, 500);
        board.pointer_up(400, 500);
        board.resize_start(id, &mut PointerEvent::new(0, 0), ResizeDirection::S);
        board.pointer_move(0, 800);
        board.pointer_up(0, 800);
    }
    assert_eq!(board.hub().active_count(), 0);
}

// ─── Timestamps ─────────────────────────────────────────────────────────

#[test]
fn updated_at_strictly_increases() {
    let (mut board, clock, id) = board_with_note();
    let created_at = board.note(id).unwrap().created_at;
    let mut last = board.note(id).unwrap().updated_at;
    assert!(last >= created_at);

    board.drag_start(id, &mut PointerEvent::new(300, 400));
    for step in 0..20 {
        // The clock only advances every other event.
        if step % 2 == 0 {
            clock.advance(1);
        }
        board.pointer_move(310 + step, 410 + step);
        let updated_at = board.note(id).unwrap().updated_at;
        assert!(updated_at > last, "step {step}: {updated_at} <= {last}");
        last = updated_at;
    }
    board.pointer_up(0, 0);
    assert_eq!(board.note(id).unwrap().created_at, created_at);
}
