//! Byte-range edits: build, validate, sort, conflict-detect, merge, apply.

use std::cmp::Ordering;

/// A half-open byte range `[start, end)` plus a replacement string.
/// `start == end` is an insertion; an empty `replacement` is a deletion.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    pub fn replace(start: usize, end: usize, text: impl Into<String>) -> Self {
        Edit {
            start,
            end,
            replacement: text.into(),
        }
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Edit::replace(offset, offset, text)
    }

    pub fn delete(start: usize, end: usize) -> Self {
        Edit::replace(start, end, "")
    }

    pub fn is_pure_deletion(&self) -> bool {
        self.replacement.is_empty() && self.end > self.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("invalid edit {edit:?}: {reason}")]
    InvalidEdit { edit: Edit, reason: &'static str },
    #[error("edit {later:?} conflicts with earlier edit {earlier:?}")]
    Conflict { earlier: Edit, later: Edit },
}

/// Validates every edit against content length `L`: `0 <= start <= end <= L`.
pub fn validate(edits: &[Edit], len: usize) -> Result<(), EditError> {
    for edit in edits {
        if edit.start > edit.end {
            return Err(EditError::InvalidEdit {
                edit: edit.clone(),
                reason: "end-before-start",
            });
        }
        if edit.end > len {
            return Err(EditError::InvalidEdit {
                edit: edit.clone(),
                reason: "end-exceeds-length",
            });
        }
        // start is a usize; "negative start" cannot occur in this
        // representation, but we keep the reason in EditError for parity
        // with the abstract spec's error taxonomy.
    }
    Ok(())
}

/// Ascending by `start`, then ascending by `end`. Stable.
pub fn sort(edits: &mut [Edit]) {
    edits.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
}

/// Strict preparation: validate, sort, and fail on the first conflicting
/// pair. Edit *i* conflicts with edit *i-1* iff `edit[i].start < edit[i-1].end`.
pub fn prepare_strict(mut edits: Vec<Edit>, len: usize) -> Result<Vec<Edit>, EditError> {
    validate(&edits, len)?;
    sort(&mut edits);
    for window in edits.windows(2) {
        let (earlier, later) = (&window[0], &window[1]);
        if later.start < earlier.end {
            return Err(EditError::Conflict {
                earlier: earlier.clone(),
                later: later.clone(),
            });
        }
    }
    Ok(edits)
}

#[derive(Debug, Clone, Default)]
pub struct Prepared {
    pub accepted: Vec<Edit>,
    pub skipped: Vec<Edit>,
    pub merged_count: usize,
}

/// Lenient preparation used by the engine: sort, then sweep. Overlapping
/// pure deletions merge; any other overlap is resolved earlier-start-wins
/// (the later edit is skipped).
pub fn prepare_lenient(mut edits: Vec<Edit>, len: usize) -> Result<Prepared, EditError> {
    validate(&edits, len)?;
    sort(&mut edits);

    let mut out = Prepared::default();
    let mut iter = edits.into_iter();
    let Some(mut current) = iter.next() else {
        return Ok(out);
    };

    for succ in iter {
        if succ.start >= current.end {
            let finished = std::mem::replace(&mut current, succ);
            out.accepted.push(finished);
        } else if current.is_pure_deletion() && succ.is_pure_deletion() {
            current = Edit::delete(current.start.min(succ.start), current.end.max(succ.end));
            out.merged_count += 1;
        } else {
            out.skipped.push(succ);
        }
    }
    out.accepted.push(current);
    Ok(out)
}

/// Compares two edits for the purpose of detecting an overlap after sort;
/// exposed for callers that want to reason about edit ordering directly
/// rather than re-deriving it from `start`/`end` comparisons.
pub fn cmp(a: &Edit, b: &Edit) -> Ordering {
    a.start.cmp(&b.start).then(a.end.cmp(&b.end))
}

/// Applies a sorted, non-overlapping edit set to `content`. Never mutates
/// `content`; output size is `L + sum(len(new) - (end-start))`.
pub fn apply(content: &[u8], accepted: &[Edit]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut cursor = 0usize;
    for edit in accepted {
        out.extend_from_slice(&content[cursor..edit.start]);
        out.extend_from_slice(edit.replacement.as_bytes());
        cursor = edit.end;
    }
    out.extend_from_slice(&content[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_replacement() {
        let content = b"hello world";
        let accepted = prepare_lenient(vec![Edit::replace(0, 5, "hi")], content.len())
            .unwrap()
            .accepted;
        assert_eq!(apply(content, &accepted), b"hi world");
    }

    #[test]
    fn overlap_merge_deletions() {
        let edits = vec![Edit::delete(6606, 6608), Edit::delete(6607, 6608)];
        let prepared = prepare_lenient(edits, 10000).unwrap();
        assert_eq!(prepared.accepted, vec![Edit::delete(6606, 6608)]);
        assert_eq!(prepared.merged_count, 1);
        assert!(prepared.skipped.is_empty());
    }

    #[test]
    fn overlap_filter_replacements() {
        let edits = vec![Edit::replace(0, 7, "foo"), Edit::replace(5, 10, "bar")];
        let prepared = prepare_lenient(edits, 20).unwrap();
        assert_eq!(prepared.accepted, vec![Edit::replace(0, 7, "foo")]);
        assert_eq!(prepared.skipped, vec![Edit::replace(5, 10, "bar")]);
        assert_eq!(prepared.merged_count, 0);
    }

    #[test]
    fn invalid_edit_end_before_start() {
        let err = validate(&[Edit::replace(5, 2, "x")], 10).unwrap_err();
        assert!(matches!(err, EditError::InvalidEdit { reason: "end-before-start", .. }));
    }

    #[test]
    fn invalid_edit_end_exceeds_length() {
        let err = validate(&[Edit::replace(0, 20, "x")], 10).unwrap_err();
        assert!(matches!(err, EditError::InvalidEdit { reason: "end-exceeds-length", .. }));
    }

    #[test]
    fn strict_prepare_fails_on_replacement_overlap() {
        let edits = vec![Edit::replace(0, 7, "foo"), Edit::replace(5, 10, "bar")];
        assert!(matches!(
            prepare_strict(edits, 20),
            Err(EditError::Conflict { .. })
        ));
    }

    #[test]
    fn apply_preserves_bytes_outside_accepted_ranges() {
        let content = b"abcdefghij";
        let edits = vec![Edit::replace(2, 4, "XY"), Edit::delete(7, 9)];
        let prepared = prepare_lenient(edits, content.len()).unwrap();
        let result = apply(content, &prepared.accepted);
        assert_eq!(result, b"abXYefgj");
    }

    #[test]
    fn accepted_is_sorted_and_non_overlapping() {
        let edits = vec![
            Edit::delete(10, 12),
            Edit::replace(0, 2, "a"),
            Edit::delete(5, 8),
        ];
        let prepared = prepare_lenient(edits, 20).unwrap();
        for window in prepared.accepted.windows(2) {
            assert!(window[0].end <= window[1].start);
        }
    }

    use proptest::prelude::*;

    fn arb_edit(len: usize) -> impl Strategy<Value = Edit> {
        (0..=len, 0..=3usize, "[a-z]{0,3}").prop_map(move |(start, span, text)| {
            let end = (start + span).min(len);
            Edit::replace(start.min(end), end, text)
        })
    }

    proptest! {
        /// Whatever `prepare_lenient` accepts, `apply` must leave every byte
        /// outside an accepted range untouched (§8's byte-preservation
        /// invariant).
        #[test]
        fn accepted_edits_preserve_untouched_bytes(content in "[a-z]{0,40}", raw_edits in prop::collection::vec(arb_edit(40), 0..8)) {
            let content = content.into_bytes();
            let edits: Vec<Edit> = raw_edits.into_iter().filter(|e| e.end <= content.len()).collect();
            let prepared = prepare_lenient(edits, content.len()).unwrap();

            let mut cursor = 0usize;
            for edit in &prepared.accepted {
                prop_assert!(edit.start >= cursor);
                cursor = edit.end;
            }

            let result = apply(&content, &prepared.accepted);
            let mut expected_len = content.len();
            for edit in &prepared.accepted {
                expected_len = expected_len + edit.replacement.len() - (edit.end - edit.start);
            }
            prop_assert_eq!(result.len(), expected_len);
        }

        /// `prepare_lenient`'s accepted set is always sorted by `start` and
        /// never overlaps, regardless of input order or conflicts.
        #[test]
        fn accepted_set_always_sorted_and_non_overlapping(raw_edits in prop::collection::vec(arb_edit(50), 0..10)) {
            let edits: Vec<Edit> = raw_edits.into_iter().filter(|e| e.end <= 50).collect();
            let prepared = prepare_lenient(edits, 50).unwrap();
            for window in prepared.accepted.windows(2) {
                prop_assert!(window[0].end <= window[1].start);
            }
        }
    }
}
