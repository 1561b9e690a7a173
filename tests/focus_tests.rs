//! Integration tests for focus-data stability across re-layouts.

use std::fs;

use repage::source::{FontRef, SourceSpan, StaticPage};
use repage::{reflow, Error, FocusData, ReflowMode, ReflowPage, Rotation};

/// A paragraph of twelve words, two per source line.
fn sample_source() -> StaticPage {
    let words = [
        "the", "quick", "brown", "fox", "jumps", "over", "a", "lazy", "dog", "near", "the", "gate",
    ];
    let mut page = StaticPage::new();
    for (i, word) in words.iter().enumerate() {
        page = page.with_span(SourceSpan::new(
            *word,
            (i % 2) as f32 * 110.0,
            700.0 - (i / 2) as f32 * 20.0,
            100.0,
            12.0,
            FontRef::new("Times-Roman"),
        ));
    }
    page
}

/// The run ordinals of the block containing a device point.
fn block_runs_at(page: &ReflowPage<'_>, x: f32, y: f32, w: f32, h: f32) -> Vec<usize> {
    let m = page.matrix(0.0, 0.0, w, h, Rotation::None).unwrap();
    let data = page.focus_data(&m, x, y).unwrap();
    let blocks = page.blocks().unwrap();
    blocks
        .iter()
        .find(|b| b.segment_for_run(data.run()).is_some())
        .unwrap()
        .segments
        .iter()
        .map(|s| s.run)
        .collect()
}

#[test]
fn round_trip_lands_in_same_block() {
    let source = sample_source();
    let page = reflow(&source, 300.0, 400.0, ReflowMode::Normal).unwrap();
    let m = page.matrix(0.0, 0.0, 300.0, 400.0, Rotation::None).unwrap();

    for (x, y) in [(5.0, 5.0), (150.0, 120.0), (295.0, 390.0)] {
        let data = page.focus_data(&m, x, y).unwrap();
        let pos = page.focus_position(&m, &data).unwrap();
        let original = block_runs_at(&page, x, y, 300.0, 400.0);
        let resolved = block_runs_at(&page, pos.x, pos.y, 300.0, 400.0);
        assert_eq!(original, resolved, "round trip left the block at ({x},{y})");
    }
}

#[test]
fn focus_survives_relayout_at_different_viewport() {
    let source = sample_source();

    // Capture focus on a page reflowed for a phone-sized viewport.
    let narrow = reflow(&source, 220.0, 480.0, ReflowMode::Normal).unwrap();
    let narrow_matrix = narrow.matrix(0.0, 0.0, 220.0, 480.0, Rotation::None).unwrap();
    let focus = narrow.focus_data(&narrow_matrix, 10.0, 30.0).unwrap();
    let bytes = focus.to_bytes().unwrap();

    // Re-layout the same content for a tablet-sized viewport; the byte
    // string still names the same run.
    let wide = reflow(&source, 500.0, 300.0, ReflowMode::Normal).unwrap();
    let wide_matrix = wide.matrix(0.0, 0.0, 500.0, 300.0, Rotation::None).unwrap();
    let decoded = FocusData::from_bytes(&bytes).unwrap();
    let pos = wide.focus_position(&wide_matrix, &decoded).unwrap();

    // The device point on the wide layout maps back to the same run.
    let back = wide.focus_data(&wide_matrix, pos.x, pos.y).unwrap();
    assert_eq!(back.run(), focus.run());
}

#[test]
fn focus_position_consistent_across_rotations() {
    let source = sample_source();
    let page = reflow(&source, 300.0, 400.0, ReflowMode::Normal).unwrap();

    let upright = page.matrix(0.0, 0.0, 300.0, 400.0, Rotation::None).unwrap();
    let data = page.focus_data(&upright, 50.0, 40.0).unwrap();

    // Resolving through a rotated matrix must agree with transforming
    // through that same matrix, i.e. the same run is found again.
    let rotated = page
        .matrix(0.0, 0.0, 400.0, 300.0, Rotation::Clockwise90)
        .unwrap();
    let pos = page.focus_position(&rotated, &data).unwrap();
    let again = page.focus_data(&rotated, pos.x, pos.y).unwrap();
    assert_eq!(again.run(), data.run());
}

#[test]
fn focus_bytes_persist_through_file() {
    let source = sample_source();
    let page = reflow(&source, 300.0, 400.0, ReflowMode::Normal).unwrap();
    let m = page.matrix(0.0, 0.0, 300.0, 400.0, Rotation::None).unwrap();

    let focus = page.focus_data(&m, 120.0, 60.0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmark.focus");
    fs::write(&path, focus.to_bytes().unwrap()).unwrap();

    let restored = FocusData::from_bytes(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(restored, focus);
    assert!(page.focus_position(&m, &restored).is_ok());
}

#[test]
fn truncated_bytes_rejected() {
    let source = sample_source();
    let page = reflow(&source, 300.0, 400.0, ReflowMode::Normal).unwrap();
    let m = page.matrix(0.0, 0.0, 300.0, 400.0, Rotation::None).unwrap();

    let bytes = page.focus_data(&m, 10.0, 10.0).unwrap().to_bytes().unwrap();
    let truncated = &bytes[..bytes.len() / 2];
    assert!(matches!(
        FocusData::from_bytes(truncated),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn stale_ordinal_rejected_on_smaller_content() {
    // Focus captured against a twelve-run source...
    let source = sample_source();
    let page = reflow(&source, 300.0, 400.0, ReflowMode::Normal).unwrap();
    let m = page.matrix(0.0, 0.0, 300.0, 400.0, Rotation::None).unwrap();
    let data = page.focus_data(&m, 290.0, 390.0).unwrap();

    // ...does not resolve against a different, shorter document.
    let short = StaticPage::new().with_span(SourceSpan::new(
        "only",
        0.0,
        700.0,
        50.0,
        12.0,
        FontRef::new("Times-Roman"),
    ));
    let short_page = reflow(&short, 300.0, 400.0, ReflowMode::Normal).unwrap();
    let short_matrix = short_page
        .matrix(0.0, 0.0, 300.0, 400.0, Rotation::None)
        .unwrap();
    assert!(matches!(
        short_page.focus_position(&short_matrix, &data),
        Err(Error::InvalidParameter(_))
    ));
}
