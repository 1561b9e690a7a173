//! Content extraction: from painted page content to reading order.
//!
//! The source page hands over spans and images in paint order, which on
//! real documents bears little relation to how a person reads them.
//! Extraction sorts items top-to-bottom, gathers spans that share a
//! baseline, orders each baseline left-to-right (right-to-left when the
//! text is RTL-dominant), and emits one [`ContentRun`] per item. The
//! resulting sequence order is the reading order every later stage
//! depends on: pagination packs it, and focus ordinals index into it.

mod run;

pub use run::{ContentRun, ImageRun, TextRun};

pub(crate) use run::{ASCENT_FACTOR, DESCENT_FACTOR};

use unicode_bidi::BidiInfo;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::source::{SourceImage, SourcePage, SourceSpan};

/// Baseline grouping tolerance as a fraction of the font size.
const BASELINE_TOLERANCE_FACTOR: f32 = 0.3;

/// Fallback average character width as a fraction of the font size,
/// used when the parser did not measure the span.
const FALLBACK_CHAR_WIDTH_FACTOR: f32 = 0.5;

/// Extract the page's content as an ordered run sequence.
///
/// Fails with [`Error::NotParsed`] when the page has not completed
/// content parsing. The output order is reading order, not paint order.
pub fn extract_runs(page: &dyn SourcePage) -> Result<Vec<ContentRun>> {
    if !page.is_parsed() {
        return Err(Error::NotParsed);
    }

    let mut items: Vec<SourceItem> = Vec::new();
    for span in page.spans() {
        if span.text.trim().is_empty() {
            continue;
        }
        items.try_reserve(1)?;
        items.push(SourceItem::Span(span));
    }
    for image in page.images() {
        items.try_reserve(1)?;
        items.push(SourceItem::Image(image));
    }

    // Top-to-bottom in y-up page coordinates; ties resolved left-to-right.
    items.sort_by(|a, b| {
        let y_cmp = b
            .sort_y()
            .partial_cmp(&a.sort_y())
            .unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.sort_x()
                .partial_cmp(&b.sort_x())
                .unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut runs: Vec<ContentRun> = Vec::new();
    runs.try_reserve(items.len())?;

    let mut baseline: Vec<SourceSpan> = Vec::new();
    let mut baseline_y: Option<f32> = None;

    for item in items {
        match item {
            SourceItem::Span(span) => {
                let tolerance = span.font_size * BASELINE_TOLERANCE_FACTOR;
                match baseline_y {
                    Some(y) if (span.y - y).abs() <= tolerance => {
                        baseline.push(span);
                    }
                    _ => {
                        flush_baseline(&mut baseline, &mut runs);
                        baseline_y = Some(span.y);
                        baseline.push(span);
                    }
                }
            }
            SourceItem::Image(image) => {
                // Images break baselines and stand alone.
                flush_baseline(&mut baseline, &mut runs);
                baseline_y = None;
                runs.push(ContentRun::Image(ImageRun {
                    bitmap: image.bitmap,
                    origin: image.rect,
                }));
            }
        }
    }
    flush_baseline(&mut baseline, &mut runs);

    log::debug!("extracted {} runs in reading order", runs.len());
    Ok(runs)
}

/// Emit the pending baseline group in visual-to-logical order.
fn flush_baseline(baseline: &mut Vec<SourceSpan>, runs: &mut Vec<ContentRun>) {
    if baseline.is_empty() {
        return;
    }

    baseline.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    if is_rtl_dominant(baseline) {
        baseline.reverse();
    }

    for span in baseline.drain(..) {
        runs.push(ContentRun::Text(text_run(span)));
    }
}

/// Whether a baseline group's text is predominantly right-to-left.
///
/// Left-to-right positional order would invert the logical order of RTL
/// text, so such baselines are read right-to-left instead.
fn is_rtl_dominant(spans: &[SourceSpan]) -> bool {
    let text: String = spans.iter().map(|s| s.text.as_str()).collect();
    if text.is_empty() {
        return false;
    }
    let info = BidiInfo::new(&text, None);
    info.paragraphs.first().is_some_and(|p| p.level.is_rtl())
}

fn text_run(span: SourceSpan) -> TextRun {
    let width = if span.width > 0.0 {
        span.width
    } else {
        span.text.chars().count() as f32 * span.font_size * FALLBACK_CHAR_WIDTH_FACTOR
    };
    TextRun {
        text: span.text.nfc().collect(),
        font: span.font,
        font_size: span.font_size,
        // y-up page rect spanning descender to ascender.
        origin: Rect::new(
            span.x,
            span.y - span.font_size * DESCENT_FACTOR,
            width,
            span.font_size * (ASCENT_FACTOR + DESCENT_FACTOR),
        ),
    }
}

enum SourceItem {
    Span(SourceSpan),
    Image(SourceImage),
}

impl SourceItem {
    /// Sort key: the item's top edge in y-up page coordinates.
    fn sort_y(&self) -> f32 {
        match self {
            SourceItem::Span(s) => s.y,
            SourceItem::Image(i) => i.rect.y + i.rect.height,
        }
    }

    fn sort_x(&self) -> f32 {
        match self {
            SourceItem::Span(s) => s.x,
            SourceItem::Image(i) => i.rect.x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{BitmapRef, FontRef, StaticPage};

    fn span(text: &str, x: f32, y: f32) -> SourceSpan {
        SourceSpan::new(text, x, y, 40.0, 12.0, FontRef::new("Helvetica"))
    }

    fn text_of(run: &ContentRun) -> &str {
        match run {
            ContentRun::Text(t) => &t.text,
            ContentRun::Image(_) => "<image>",
        }
    }

    #[test]
    fn test_unparsed_page_fails() {
        let page = StaticPage::unparsed();
        assert!(matches!(extract_runs(&page), Err(Error::NotParsed)));
    }

    #[test]
    fn test_reading_order_top_to_bottom() {
        // Paint order is deliberately scrambled; y is PDF-style (up).
        let page = StaticPage::new()
            .with_span(span("world", 60.0, 700.0))
            .with_span(span("second line", 10.0, 680.0))
            .with_span(span("hello", 10.0, 700.0));

        let runs = extract_runs(&page).unwrap();
        let texts: Vec<&str> = runs.iter().map(text_of).collect();
        assert_eq!(texts, vec!["hello", "world", "second line"]);
    }

    #[test]
    fn test_baseline_tolerance_groups_jittered_spans() {
        // 2pt of baseline jitter at 12pt text stays on one line.
        let page = StaticPage::new()
            .with_span(span("b", 50.0, 698.5))
            .with_span(span("a", 10.0, 700.0));

        let runs = extract_runs(&page).unwrap();
        let texts: Vec<&str> = runs.iter().map(text_of).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_image_breaks_baseline_and_orders_by_top() {
        let page = StaticPage::new()
            .with_span(span("above", 10.0, 700.0))
            .with_image(SourceImage::new(
                BitmapRef::new("img1", 200, 100),
                Rect::new(10.0, 500.0, 200.0, 100.0),
            ))
            .with_span(span("below", 10.0, 450.0));

        let runs = extract_runs(&page).unwrap();
        assert_eq!(runs.len(), 3);
        assert!(runs[0].is_text());
        assert!(runs[1].is_image());
        assert!(runs[2].is_text());
    }

    #[test]
    fn test_rtl_baseline_reads_right_to_left() {
        // Hebrew spans positioned visually left-to-right; logical order
        // starts from the rightmost span.
        let page = StaticPage::new()
            .with_span(span("שלום", 10.0, 700.0))
            .with_span(span("עולם", 80.0, 700.0));

        let runs = extract_runs(&page).unwrap();
        let texts: Vec<&str> = runs.iter().map(text_of).collect();
        assert_eq!(texts, vec!["עולם", "שלום"]);
    }

    #[test]
    fn test_text_is_nfc_normalized() {
        // "e" + combining acute accent normalizes to a single scalar.
        let page = StaticPage::new().with_span(span("e\u{0301}", 10.0, 700.0));
        let runs = extract_runs(&page).unwrap();
        assert_eq!(text_of(&runs[0]), "\u{00e9}");
    }

    #[test]
    fn test_whitespace_spans_dropped() {
        let page = StaticPage::new()
            .with_span(span("   ", 10.0, 700.0))
            .with_span(span("kept", 10.0, 680.0));
        let runs = extract_runs(&page).unwrap();
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn test_unmeasured_span_width_estimated() {
        let s = SourceSpan::new("abcd", 0.0, 700.0, 0.0, 10.0, FontRef::new("Courier"));
        let page = StaticPage::new().with_span(s);
        let runs = extract_runs(&page).unwrap();
        // 4 chars * 10pt * 0.5
        assert_eq!(runs[0].origin().width, 20.0);
    }
}
