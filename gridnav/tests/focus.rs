use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gridnav::{
    Cell, ColumnLayout, FocusEvent, FocusOptions, FocusState, FocusStrategy, Key, KeyInput,
    NavOutcome, NextCellDirection, Platform, Region,
};

/// Four columns with the third hidden: one header row, three content rows,
/// one aggregate row.
fn strategy() -> FocusStrategy {
    strategy_with(FocusOptions::default())
}

fn strategy_with(options: FocusOptions) -> FocusStrategy {
    let mut s = FocusStrategy::new(options);
    s.rebuild(&[true, true, false, true], 1, 3, 1);
    s
}

fn key(s: &mut FocusStrategy, key: Key) -> NavOutcome {
    s.handle_key(KeyInput::plain(key))
}

fn at(s: &FocusStrategy) -> Option<(Region, usize, usize)> {
    s.focused_cell()
        .map(|f| (f.region, f.row_index, f.col_index))
}

// ============================================================================
// Arrow keys
// ============================================================================

#[test]
fn test_arrows_move_within_content_and_skip_hidden() {
    let mut s = strategy();
    s.navigate_to_cell(0, 0, Region::Content);

    key(&mut s, Key::Right);
    assert_eq!(at(&s), Some((Region::Content, 0, 1)));
    key(&mut s, Key::Right);
    assert_eq!(at(&s), Some((Region::Content, 0, 3)));
    assert_eq!(key(&mut s, Key::Right), NavOutcome::Stayed);
    assert_eq!(at(&s), Some((Region::Content, 0, 3)));

    key(&mut s, Key::Down);
    assert_eq!(at(&s), Some((Region::Content, 1, 3)));
    key(&mut s, Key::Left);
    assert_eq!(at(&s), Some((Region::Content, 1, 1)));
}

#[test]
fn test_rtl_mirrors_horizontal_arrows() {
    let mut ltr = strategy();
    let mut rtl = strategy_with(FocusOptions {
        rtl: true,
        ..Default::default()
    });
    ltr.navigate_to_cell(1, 1, Region::Content);
    rtl.navigate_to_cell(1, 1, Region::Content);

    key(&mut ltr, Key::Right);
    key(&mut rtl, Key::Right);
    assert_eq!(at(&ltr), Some((Region::Content, 1, 3)));
    assert_eq!(at(&rtl), Some((Region::Content, 1, 0)));
}

#[test]
fn test_vertical_arrows_cross_regions_preserving_column() {
    let mut s = strategy();
    s.navigate_to_cell(0, 3, Region::Header);

    key(&mut s, Key::Down);
    assert_eq!(at(&s), Some((Region::Content, 0, 3)));
    assert_eq!(s.state(), FocusState::ContentActive);

    key(&mut s, Key::Up);
    assert_eq!(at(&s), Some((Region::Header, 0, 3)));
    assert_eq!(s.state(), FocusState::HeaderActive);

    s.navigate_to_cell(2, 1, Region::Content);
    key(&mut s, Key::Down);
    assert_eq!(at(&s), Some((Region::Aggregate, 0, 1)));
    assert_eq!(s.state(), FocusState::AggregateActive);
    assert_eq!(key(&mut s, Key::Down), NavOutcome::Stayed);
}

#[test]
fn test_enter_and_shift_enter_move_vertically() {
    let mut s = strategy();
    s.navigate_to_cell(0, 1, Region::Content);
    key(&mut s, Key::Enter);
    assert_eq!(at(&s), Some((Region::Content, 1, 1)));
    s.handle_key(KeyInput::shift(Key::Enter));
    assert_eq!(at(&s), Some((Region::Content, 0, 1)));
}

// ============================================================================
// Tab order
// ============================================================================

#[test]
fn test_tab_walks_reading_order_across_regions() {
    let mut s = strategy();
    s.navigate_to_first_cell();
    assert_eq!(at(&s), Some((Region::Header, 0, 0)));

    key(&mut s, Key::Tab);
    assert_eq!(at(&s), Some((Region::Header, 0, 1)));
    key(&mut s, Key::Tab);
    assert_eq!(at(&s), Some((Region::Header, 0, 3)));
    key(&mut s, Key::Tab);
    assert_eq!(at(&s), Some((Region::Content, 0, 0)));
    key(&mut s, Key::Tab);
    key(&mut s, Key::Tab);
    key(&mut s, Key::Tab);
    assert_eq!(at(&s), Some((Region::Content, 1, 0)));
}

#[test]
fn test_shift_tab_from_first_content_cell_lands_on_last_header_cell() {
    let mut s = strategy();
    s.navigate_to_cell(0, 0, Region::Content);
    s.handle_key(KeyInput::shift(Key::Tab));
    assert_eq!(at(&s), Some((Region::Header, 0, 3)));
    assert_eq!(s.active_matrix(), Region::Header);
}

#[test]
fn test_tab_from_header_skips_to_aggregate_without_content_rows() {
    let mut s = FocusStrategy::default();
    s.rebuild(&[true, true], 1, 0, 1);
    s.navigate_to_cell(0, 1, Region::Header);
    key(&mut s, Key::Tab);
    assert_eq!(at(&s), Some((Region::Aggregate, 0, 0)));
}

#[test]
fn test_shift_tab_at_first_header_cell_escapes() {
    let mut s = strategy();
    s.navigate_to_cell(0, 0, Region::Header);
    s.take_events();

    assert_eq!(s.handle_key(KeyInput::shift(Key::Tab)), NavOutcome::Released);
    assert!(!s.has_indicator());
    assert!(!s.is_grid_focused());
    assert_eq!(s.focused_cell(), None);
    assert_eq!(s.state(), FocusState::Unfocused);
    assert_eq!(s.header_matrix().current(), None);
    assert_eq!(s.content_matrix().current(), None);

    let events = s.take_events();
    assert!(events.contains(&FocusEvent::IndicatorCleared));
    assert_eq!(events.last(), Some(&FocusEvent::Released));
}

#[test]
fn test_tab_at_last_aggregate_cell_escapes() {
    let mut s = strategy();
    s.navigate_to_last_cell();
    assert_eq!(at(&s), Some((Region::Aggregate, 0, 3)));
    assert_eq!(key(&mut s, Key::Tab), NavOutcome::Released);
    assert!(!s.has_indicator());
    assert!(!s.is_grid_focused());
}

#[test]
fn test_tab_at_last_content_cell_escapes_without_aggregate() {
    let mut s = FocusStrategy::default();
    s.rebuild(&[true, true, false, true], 1, 3, 0);
    assert_eq!(s.last_focusable_content_cell(), Some(Cell::new(2, 3)));
    s.navigate_to_cell(2, 3, Region::Content);
    assert_eq!(key(&mut s, Key::Tab), NavOutcome::Released);
    assert_eq!(s.state(), FocusState::Unfocused);
}

#[test]
fn test_tab_enters_unfocused_grid() {
    let mut s = strategy();
    assert_eq!(s.state(), FocusState::Unfocused);
    key(&mut s, Key::Tab);
    assert_eq!(at(&s), Some((Region::Header, 0, 0)));

    let mut s = strategy();
    s.handle_key(KeyInput::shift(Key::Tab));
    assert_eq!(at(&s), Some((Region::Aggregate, 0, 3)));
}

#[test]
fn test_arrows_ignored_while_unfocused() {
    let mut s = strategy();
    assert_eq!(key(&mut s, Key::Down), NavOutcome::Ignored);
    assert_eq!(s.focused_cell(), None);
}

// ============================================================================
// Home / End / Page keys
// ============================================================================

#[test]
fn test_home_end_within_row() {
    let mut s = strategy();
    s.navigate_to_cell(1, 1, Region::Content);
    key(&mut s, Key::End);
    assert_eq!(at(&s), Some((Region::Content, 1, 3)));
    key(&mut s, Key::Home);
    assert_eq!(at(&s), Some((Region::Content, 1, 0)));
}

#[test]
fn test_ctrl_home_end_within_active_matrix() {
    let mut s = strategy();
    s.navigate_to_cell(1, 1, Region::Content);
    s.handle_key(KeyInput::ctrl(Key::End));
    assert_eq!(at(&s), Some((Region::Content, 2, 3)));
    s.handle_key(KeyInput::ctrl(Key::Home));
    assert_eq!(at(&s), Some((Region::Content, 0, 0)));
}

#[test]
fn test_mac_meta_home_jumps_but_meta_arrow_does_not_move() {
    let mut s = strategy_with(FocusOptions {
        platform: Platform::Mac,
        ..Default::default()
    });
    s.navigate_to_cell(1, 1, Region::Content);

    assert_eq!(s.handle_key(KeyInput::meta(Key::Right)), NavOutcome::Ignored);
    assert_eq!(s.handle_key(KeyInput::meta(Key::Left)), NavOutcome::Ignored);
    assert_eq!(at(&s), Some((Region::Content, 1, 1)));

    s.handle_key(KeyInput::meta(Key::End));
    assert_eq!(at(&s), Some((Region::Content, 2, 3)));
    s.handle_key(KeyInput::meta(Key::Home));
    assert_eq!(at(&s), Some((Region::Content, 0, 0)));
}

#[test]
fn test_page_down_moves_one_viewport_and_queues_scroll() {
    let mut s = FocusStrategy::default();
    s.rebuild(&[true, true], 1, 30, 0);
    s.set_layout(ColumnLayout::new(vec![100, 100], 400).with_rows(20, 100));
    s.navigate_to_cell(0, 1, Region::Content);

    key(&mut s, Key::PageDown);
    assert_eq!(at(&s), Some((Region::Content, 5, 1)));
    let request = s.take_scroll_request().expect("scroll request queued");
    assert_eq!(request.row, 5);
    assert_eq!(request.top, 20);
    assert_eq!(s.take_scroll_request(), None);

    key(&mut s, Key::PageUp);
    assert_eq!(at(&s), Some((Region::Content, 0, 1)));
    assert_eq!(s.take_scroll_request().map(|r| r.top), Some(0));
}

#[test]
fn test_page_scroll_offset_saturates_for_tall_rows() {
    let mut s = FocusStrategy::default();
    s.rebuild(&[true], 1, 10, 0);
    s.set_layout(ColumnLayout::new(vec![100], 100).with_rows(u32::MAX / 2, u32::MAX / 2));
    s.navigate_to_cell(0, 0, Region::Content);

    key(&mut s, Key::PageDown);
    assert_eq!(at(&s), Some((Region::Content, 1, 0)));
    key(&mut s, Key::PageDown);
    assert_eq!(at(&s), Some((Region::Content, 2, 0)));
    let request = s.take_scroll_request().expect("scroll request queued");
    assert_eq!(request.row, 2);
    assert_eq!(request.top, u32::MAX - u32::MAX / 2);

    s.navigate_to_cell(9, 0, Region::Content);
    key(&mut s, Key::PageUp);
    assert_eq!(at(&s), Some((Region::Content, 8, 0)));
    assert_eq!(s.take_scroll_request().map(|r| r.top), Some(u32::MAX));
}

#[test]
fn test_page_keys_ignored_without_scrollable_area() {
    let mut s = strategy();
    s.navigate_to_cell(0, 0, Region::Content);
    assert_eq!(key(&mut s, Key::PageDown), NavOutcome::Ignored);
    assert_eq!(at(&s), Some((Region::Content, 0, 0)));
}

// ============================================================================
// Global shortcuts and other keys
// ============================================================================

#[test]
fn test_alt_j_focuses_grid_without_cell() {
    let mut s = strategy();
    assert_eq!(s.handle_key(KeyInput::alt(Key::Char('j'))), NavOutcome::GridFocused);
    assert!(s.is_grid_focused());
    assert!(!s.has_indicator());
    assert_eq!(s.focused_cell(), None);
}

#[test]
fn test_alt_w_focuses_first_content_cell() {
    let mut s = strategy();
    s.navigate_to_cell(0, 3, Region::Header);
    s.handle_key(KeyInput::alt(Key::Char('w')));
    assert_eq!(at(&s), Some((Region::Content, 0, 0)));
}

#[test]
fn test_letter_key_leaves_focus_unchanged() {
    let mut s = strategy();
    s.navigate_to_cell(1, 1, Region::Content);
    s.take_events();
    assert_eq!(key(&mut s, Key::Char('x')), NavOutcome::Ignored);
    assert_eq!(at(&s), Some((Region::Content, 1, 1)));
    assert!(s.take_events().is_empty());
}

// ============================================================================
// Cancellation and events
// ============================================================================

#[test]
fn test_before_focus_cancel_keeps_previous_position() {
    let mut s = strategy();
    s.navigate_to_cell(0, 0, Region::Content);
    s.on_before_focus(|args| args.cancel = true);

    assert_eq!(key(&mut s, Key::Down), NavOutcome::Cancelled);
    assert_eq!(at(&s), Some((Region::Content, 0, 0)));
    assert_eq!(s.content_matrix().current(), Some(Cell::new(0, 0)));
}

#[test]
fn test_before_focus_sees_previous_and_target() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let mut s = strategy();
    s.on_before_focus(move |args| {
        seen.fetch_add(1, Ordering::SeqCst);
        if args.target.is_header() {
            args.cancel = true;
        }
    });

    s.navigate_to_cell(0, 0, Region::Content);
    assert_eq!(key(&mut s, Key::Up), NavOutcome::Cancelled);
    assert_eq!(at(&s), Some((Region::Content, 0, 0)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_move_emits_blur_then_focus() {
    let mut s = strategy();
    s.navigate_to_cell(0, 0, Region::Content);
    s.take_events();
    key(&mut s, Key::Right);
    let events = s.take_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], FocusEvent::Blurred(f) if f.col_index == 0));
    assert!(matches!(events[1], FocusEvent::Focused(f) if f.col_index == 1));
}

#[test]
fn test_clear_indicator_keeps_position_remove_focus_drops_it() {
    let mut s = strategy();
    s.navigate_to_cell(1, 1, Region::Content);
    s.clear_indicator();
    assert!(!s.has_indicator());
    assert!(s.focused_cell().is_some());

    s.remove_focus();
    assert_eq!(s.focused_cell(), None);
    assert!(!s.is_grid_focused());
}

#[test]
fn test_next_cell_direction() {
    let mut s = strategy();
    s.navigate_to_cell(0, 0, Region::Content);
    s.navigate_to_next_cell(NextCellDirection::Next);
    assert_eq!(at(&s), Some((Region::Content, 0, 1)));
    s.navigate_to_next_cell(NextCellDirection::Down);
    assert_eq!(at(&s), Some((Region::Content, 1, 1)));
    s.navigate_to_next_cell(NextCellDirection::Previous);
    assert_eq!(at(&s), Some((Region::Content, 1, 0)));
}

#[test]
fn test_navigate_to_unfocusable_cell_stays() {
    let mut s = strategy();
    assert_eq!(s.navigate_to_cell(0, 2, Region::Content), NavOutcome::Stayed);
    assert_eq!(s.navigate_to_cell(7, 0, Region::Content), NavOutcome::Stayed);
    assert_eq!(s.focused_cell(), None);
}

// ============================================================================
// Empty content and rebuilds
// ============================================================================

#[test]
fn test_empty_content_targets_placeholder_row() {
    let mut s = FocusStrategy::default();
    s.rebuild(&[true, true, true], 1, 0, 0);
    s.navigate_to_cell(0, 2, Region::Header);

    key(&mut s, Key::Down);
    let focused = s.focused_cell().expect("placeholder focused");
    assert!(focused.is_placeholder);
    assert_eq!((focused.region, focused.row_index, focused.col_index), (Region::Content, 0, 0));

    key(&mut s, Key::Up);
    assert_eq!(at(&s), Some((Region::Header, 0, 0)));
    key(&mut s, Key::Right);
    assert_eq!(at(&s), Some((Region::Header, 0, 1)));
}

#[test]
fn test_rebuild_clamps_vanished_focus() {
    let mut s = strategy();
    s.navigate_to_cell(2, 1, Region::Content);
    s.rebuild(&[true, true, false, true], 1, 1, 1);
    assert_eq!(at(&s), Some((Region::Content, 0, 1)));
    assert_eq!(s.content_matrix().current(), Some(Cell::new(0, 1)));
}

#[test]
fn test_rebuild_after_hiding_focused_column() {
    let mut s = strategy();
    s.navigate_to_cell(1, 1, Region::Content);
    s.rebuild(&[true, false, false, true], 1, 3, 1);
    assert_eq!(at(&s), Some((Region::Content, 1, 0)));
}

// ============================================================================
// Horizontal scroll synchronization
// ============================================================================

#[test]
fn test_focus_reveals_column_in_header_and_content() {
    let mut s = strategy();
    s.set_layout(ColumnLayout::new(vec![100, 100, 0, 100], 150));
    s.navigate_to_cell(0, 3, Region::Content);
    assert_eq!(s.scroll().content_left(), 150);
    assert_eq!(s.scroll().header_left(), 150);

    s.navigate_to_cell(0, 0, Region::Content);
    assert_eq!(s.scroll().content_left(), 0);
    assert_eq!(s.scroll().header_left(), 0);
}

#[test]
fn test_scroll_mirror_skips_matching_positions() {
    let mut s = strategy();
    let writes = s.scroll().mirrored_writes();
    assert!(s.scroll_mut().set_header_left(40));
    assert_eq!(s.scroll().content_left(), 40);
    assert_eq!(s.scroll().mirrored_writes(), writes + 1);

    // Host echoes the content scroll back: nothing to mirror.
    assert!(!s.scroll_mut().set_content_left(40));
    assert_eq!(s.scroll().mirrored_writes(), writes + 1);
}
