//! Word-level diff between an original and a revised text
//!
//! The aligner walks both token streams with a bounded lookahead window
//! rather than computing a minimal edit script. For the short-to-medium
//! texts a revision step produces, the greedy result is close enough to
//! minimal for human review and runs in O(n * W).

use serde::{Deserialize, Serialize};

/// How far ahead each cursor scans for a resynchronization point.
pub const LOOKAHEAD_WINDOW: usize = 5;

/// Classification of a run of tokens in the merged view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// Present in both texts
    Unchanged,
    /// Present only in the original
    Deleted,
    /// Present only in the revision
    Inserted,
}

/// A maximal run of tokens sharing one classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSpan {
    pub kind: SpanKind,
    pub tokens: Vec<String>,
}

/// Where the cursors can resynchronize within the lookahead window
enum Resync {
    /// `k` old tokens were deleted; old cursor advances by `k`
    DeleteOld(usize),
    /// `k` new tokens were inserted; new cursor advances by `k`
    InsertNew(usize),
}

/// Accumulates tokens into maximal same-kind spans
struct SpanBuilder {
    spans: Vec<DiffSpan>,
}

impl SpanBuilder {
    fn new() -> Self {
        Self { spans: Vec::new() }
    }

    fn push(&mut self, kind: SpanKind, token: &str) {
        match self.spans.last_mut() {
            Some(span) if span.kind == kind => span.tokens.push(token.to_string()),
            _ => self.spans.push(DiffSpan {
                kind,
                tokens: vec![token.to_string()],
            }),
        }
    }

    fn finish(self) -> Vec<DiffSpan> {
        self.spans
    }
}

/// Align two texts into a merged sequence of diff spans.
///
/// Tokens are whitespace-delimited words. Both inputs should already be
/// escaped (see [`escape`]) if the spans will be fed into a markup
/// renderer.
///
/// The result satisfies the round-trip property: the unchanged and
/// deleted tokens, in order, reconstruct the original token stream, and
/// the unchanged and inserted tokens reconstruct the revised one.
pub fn align(original: &str, modified: &str) -> Vec<DiffSpan> {
    let old: Vec<&str> = original.split_whitespace().collect();
    let new: Vec<&str> = modified.split_whitespace().collect();

    let mut spans = SpanBuilder::new();
    let mut i = 0;
    let mut j = 0;

    while i < old.len() || j < new.len() {
        if i >= old.len() {
            // Only new tokens remain
            spans.push(SpanKind::Inserted, new[j]);
            j += 1;
            continue;
        }
        if j >= new.len() {
            // Only old tokens remain
            spans.push(SpanKind::Deleted, old[i]);
            i += 1;
            continue;
        }
        if old[i] == new[j] {
            spans.push(SpanKind::Unchanged, old[i]);
            i += 1;
            j += 1;
            continue;
        }

        match resync(&old, &new, i, j) {
            Some(Resync::DeleteOld(k)) => {
                for token in &old[i..i + k] {
                    spans.push(SpanKind::Deleted, token);
                }
                i += k;
            }
            Some(Resync::InsertNew(k)) => {
                for token in &new[j..j + k] {
                    spans.push(SpanKind::Inserted, token);
                }
                j += k;
            }
            None => {
                // Fully divergent region: report one token from each side
                // and keep moving so the walk always terminates.
                spans.push(SpanKind::Deleted, old[i]);
                spans.push(SpanKind::Inserted, new[j]);
                i += 1;
                j += 1;
            }
        }
    }

    spans.finish()
}

/// Scan the lookahead window for the nearest resynchronization point.
///
/// At each distance `k` the old-side probe is tried before the new-side
/// probe, so when both sides can resynchronize at the same distance the
/// change is reported as a deletion. The smallest matching `k` wins.
fn resync(old: &[&str], new: &[&str], i: usize, j: usize) -> Option<Resync> {
    for k in 1..=LOOKAHEAD_WINDOW {
        if i + k < old.len() && old[i + k] == new[j] {
            return Some(Resync::DeleteOld(k));
        }
        if j + k < new.len() && old[i] == new[j + k] {
            return Some(Resync::InsertNew(k));
        }
    }
    None
}

/// Project the original token stream back out of a span sequence.
pub fn original_tokens(spans: &[DiffSpan]) -> Vec<String> {
    spans
        .iter()
        .filter(|s| matches!(s.kind, SpanKind::Unchanged | SpanKind::Deleted))
        .flat_map(|s| s.tokens.iter().cloned())
        .collect()
}

/// Project the revised token stream back out of a span sequence.
pub fn modified_tokens(spans: &[DiffSpan]) -> Vec<String> {
    spans
        .iter()
        .filter(|s| matches!(s.kind, SpanKind::Unchanged | SpanKind::Inserted))
        .flat_map(|s| s.tokens.iter().cloned())
        .collect()
}

/// HTML-escape a text before diffing so spans stay safe to render.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(kind: SpanKind, tokens: &[&str]) -> DiffSpan {
        DiffSpan {
            kind,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_equal_input_is_all_unchanged() {
        let spans = align("the quick brown fox", "the quick brown fox");
        assert_eq!(
            spans,
            vec![span(SpanKind::Unchanged, &["the", "quick", "brown", "fox"])]
        );
    }

    #[test]
    fn test_insertion_in_the_middle() {
        let spans = align("the cat sat", "the big cat sat");
        assert_eq!(
            spans,
            vec![
                span(SpanKind::Unchanged, &["the"]),
                span(SpanKind::Inserted, &["big"]),
                span(SpanKind::Unchanged, &["cat", "sat"]),
            ]
        );
    }

    #[test]
    fn test_deletion_in_the_middle() {
        let spans = align("the big cat sat", "the cat sat");
        assert_eq!(
            spans,
            vec![
                span(SpanKind::Unchanged, &["the"]),
                span(SpanKind::Deleted, &["big"]),
                span(SpanKind::Unchanged, &["cat", "sat"]),
            ]
        );
    }

    #[test]
    fn test_empty_original_is_one_inserted_span() {
        let spans = align("", "x y");
        assert_eq!(spans, vec![span(SpanKind::Inserted, &["x", "y"])]);
    }

    #[test]
    fn test_empty_modified_is_one_deleted_span() {
        let spans = align("x y", "");
        assert_eq!(spans, vec![span(SpanKind::Deleted, &["x", "y"])]);
    }

    #[test]
    fn test_both_empty() {
        assert!(align("", "").is_empty());
        assert!(align("   ", "\t\n").is_empty());
    }

    #[test]
    fn test_substitution_reports_delete_then_insert() {
        let spans = align("a b c", "a x c");
        assert_eq!(
            spans,
            vec![
                span(SpanKind::Unchanged, &["a"]),
                span(SpanKind::Deleted, &["b"]),
                span(SpanKind::Inserted, &["x"]),
                span(SpanKind::Unchanged, &["c"]),
            ]
        );
    }

    #[test]
    fn test_equal_distance_prefers_deletion() {
        // Both sides resynchronize at k = 1 ("b" matches "a b" at offset
        // 1 on either stream); the old-side probe wins.
        let spans = align("a b", "b a");
        assert_eq!(
            spans,
            vec![
                span(SpanKind::Deleted, &["a"]),
                span(SpanKind::Unchanged, &["b"]),
                span(SpanKind::Inserted, &["a"]),
            ]
        );
    }

    #[test]
    fn test_divergence_beyond_window_still_makes_progress() {
        // No shared token at all: every position falls back to one
        // deletion plus one insertion.
        let spans = align("a b c d e f g", "p q r s t u v");
        assert_eq!(spans.len(), 14);
        assert_eq!(original_tokens(&spans).join(" "), "a b c d e f g");
        assert_eq!(modified_tokens(&spans).join(" "), "p q r s t u v");
    }

    #[test]
    fn test_resync_just_inside_window() {
        let spans = align("a w x y z b", "a b");
        assert_eq!(
            spans,
            vec![
                span(SpanKind::Unchanged, &["a"]),
                span(SpanKind::Deleted, &["w", "x", "y", "z"]),
                span(SpanKind::Unchanged, &["b"]),
            ]
        );
    }

    #[test]
    fn test_round_trip_mixed_edits() {
        let original = "teh quick brown fox jumps over a lazy dog";
        let modified = "the quick red fox leaps over the lazy dog today";
        let spans = align(original, modified);
        assert_eq!(
            original_tokens(&spans),
            original.split_whitespace().collect::<Vec<_>>()
        );
        assert_eq!(
            modified_tokens(&spans),
            modified.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_spans_are_maximal_runs() {
        let spans = align("a b c", "a b c d e f");
        assert_eq!(spans.len(), 2);
        for pair in spans.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let spans = align("the   cat\n sat", "the cat sat");
        assert_eq!(
            spans,
            vec![span(SpanKind::Unchanged, &["the", "cat", "sat"])]
        );
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"cats" & 'dogs'</b>"#),
            "&lt;b&gt;&quot;cats&quot; &amp; &#39;dogs&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain text"), "plain text");
    }
}
