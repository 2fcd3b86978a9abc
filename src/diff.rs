//! Unified diff via LCS (longest common subsequence) over lines.

const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Context,
    Add,
    Remove,
}

#[derive(Debug, Clone)]
struct Op<'a> {
    kind: OpKind,
    line: &'a str,
    /// 0-based index into the original/modified line vector, whichever the
    /// op kind pulls from (Context reads either, since the lines are equal).
    orig_idx: Option<usize>,
    modified_idx: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Hunk {
    pub original_start: usize,
    pub original_count: usize,
    pub modified_start: usize,
    pub modified_count: usize,
    pub lines: Vec<HunkLine>,
}

#[derive(Debug, Clone)]
pub struct HunkLine {
    pub kind: HunkLineKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkLineKind {
    Context,
    Add,
    Remove,
}

#[derive(Debug, Clone)]
pub struct UnifiedDiff {
    pub path: String,
    pub hunks: Vec<Hunk>,
}

fn split_lines(content: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = content.split('\n').collect();
    if content.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// Computes a unified diff between `original` and `modified` for `path`, or
/// `None` if the line-split buffers are equal ("no changes").
pub fn unified_diff(path: &str, original: &str, modified: &str) -> Option<UnifiedDiff> {
    let a = split_lines(original);
    let b = split_lines(modified);
    if a == b {
        return None;
    }

    let ops = lcs_ops(&a, &b);
    let hunks = build_hunks(&ops, &a, &b);
    Some(UnifiedDiff {
        path: path.to_string(),
        hunks,
    })
}

/// Classic LCS table, then back-trace to emit ordered Context/Add/Remove
/// operations.
fn lcs_ops<'a>(a: &[&'a str], b: &[&'a str]) -> Vec<Op<'a>> {
    let (n, m) = (a.len(), b.len());
    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if a[i] == b[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0usize, 0usize);
    while i < n && j < m {
        if a[i] == b[j] {
            ops.push(Op {
                kind: OpKind::Context,
                line: a[i],
                orig_idx: Some(i),
                modified_idx: Some(j),
            });
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            ops.push(Op {
                kind: OpKind::Remove,
                line: a[i],
                orig_idx: Some(i),
                modified_idx: None,
            });
            i += 1;
        } else {
            ops.push(Op {
                kind: OpKind::Add,
                line: b[j],
                orig_idx: None,
                modified_idx: Some(j),
            });
            j += 1;
        }
    }
    while i < n {
        ops.push(Op {
            kind: OpKind::Remove,
            line: a[i],
            orig_idx: Some(i),
            modified_idx: None,
        });
        i += 1;
    }
    while j < m {
        ops.push(Op {
            kind: OpKind::Add,
            line: b[j],
            orig_idx: None,
            modified_idx: Some(j),
        });
        j += 1;
    }
    ops
}

fn build_hunks(ops: &[Op<'_>], a: &[&str], b: &[&str]) -> Vec<Hunk> {
    // Indices (into `ops`) of contiguous non-context runs ("change ranges").
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, op) in ops.iter().enumerate() {
        match op.kind {
            OpKind::Context => {
                if let Some(s) = start.take() {
                    ranges.push((s, idx));
                }
            }
            _ => {
                if start.is_none() {
                    start = Some(idx);
                }
            }
        }
    }
    if let Some(s) = start {
        ranges.push((s, ops.len()));
    }
    if ranges.is_empty() {
        return Vec::new();
    }

    // Coalesce change ranges whose gap <= 2 * CONTEXT_LINES.
    let mut coalesced: Vec<(usize, usize)> = vec![ranges[0]];
    for &(s, e) in &ranges[1..] {
        let last = coalesced.last_mut().unwrap();
        if s.saturating_sub(last.1) <= 2 * CONTEXT_LINES {
            last.1 = e;
        } else {
            coalesced.push((s, e));
        }
    }

    coalesced
        .into_iter()
        .map(|(s, e)| {
            let window_start = s.saturating_sub(CONTEXT_LINES);
            let window_end = (e + CONTEXT_LINES).min(ops.len());
            let window = &ops[window_start..window_end];

            let mut lines = Vec::with_capacity(window.len());
            let mut original_count = 0usize;
            let mut modified_count = 0usize;
            let mut original_start = None;
            let mut modified_start = None;

            for op in window {
                match op.kind {
                    OpKind::Context => {
                        original_count += 1;
                        modified_count += 1;
                        original_start.get_or_insert(op.orig_idx.unwrap());
                        modified_start.get_or_insert(op.modified_idx.unwrap());
                        lines.push(HunkLine {
                            kind: HunkLineKind::Context,
                            text: op.line.to_string(),
                        });
                    }
                    OpKind::Remove => {
                        original_count += 1;
                        original_start.get_or_insert(op.orig_idx.unwrap());
                        lines.push(HunkLine {
                            kind: HunkLineKind::Remove,
                            text: op.line.to_string(),
                        });
                    }
                    OpKind::Add => {
                        modified_count += 1;
                        modified_start.get_or_insert(op.modified_idx.unwrap());
                        lines.push(HunkLine {
                            kind: HunkLineKind::Add,
                            text: op.line.to_string(),
                        });
                    }
                }
            }

            let original_start = original_start.unwrap_or(0);
            let modified_start = modified_start.unwrap_or(0);
            let _ = (a, b);
            Hunk {
                original_start: original_start + 1,
                original_count,
                modified_start: modified_start + 1,
                modified_count,
                lines,
            }
        })
        .collect()
}

/// Renders git-style unified diff text.
pub fn render(diff: &UnifiedDiff) -> String {
    let mut out = String::new();
    out.push_str(&format!("diff --git a/{0} b/{0}\n", diff.path));
    out.push_str(&format!("--- a/{}\n", diff.path));
    out.push_str(&format!("+++ b/{}\n", diff.path));
    for hunk in &diff.hunks {
        out.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            hunk.original_start, hunk.original_count, hunk.modified_start, hunk.modified_count
        ));
        for line in &hunk.lines {
            let prefix = match line.kind {
                HunkLineKind::Context => ' ',
                HunkLineKind::Add => '+',
                HunkLineKind::Remove => '-',
            };
            out.push(prefix);
            out.push_str(&line.text);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_changes_returns_none() {
        assert!(unified_diff("f.md", "a\nb\n", "a\nb\n").is_none());
    }

    #[test]
    fn single_line_change_one_hunk() {
        let diff = unified_diff("f.md", "hello\nworld\n", "hello\nearth\n").unwrap();
        assert_eq!(diff.hunks.len(), 1);
        let hunk = &diff.hunks[0];
        let context = hunk.lines.iter().filter(|l| l.kind == HunkLineKind::Context).count();
        let removed = hunk.lines.iter().filter(|l| l.kind == HunkLineKind::Remove).count();
        let added = hunk.lines.iter().filter(|l| l.kind == HunkLineKind::Add).count();
        assert_eq!(context, 1);
        assert_eq!(removed, 1);
        assert_eq!(added, 1);
        assert_eq!(context + removed, hunk.original_count);
        assert_eq!(context + added, hunk.modified_count);
        assert!(hunk.lines.iter().any(|l| l.kind == HunkLineKind::Remove && l.text == "world"));
        assert!(hunk.lines.iter().any(|l| l.kind == HunkLineKind::Add && l.text == "earth"));
    }

    #[test]
    fn distant_changes_split_into_separate_hunks() {
        let original = (0..40).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n") + "\n";
        let mut modified_lines: Vec<String> = (0..40).map(|i| format!("line{i}")).collect();
        modified_lines[0] = "CHANGED-0".to_string();
        modified_lines[39] = "CHANGED-39".to_string();
        let modified = modified_lines.join("\n") + "\n";
        let diff = unified_diff("f.md", &original, &modified).unwrap();
        assert_eq!(diff.hunks.len(), 2);
    }

    #[test]
    fn render_produces_git_style_headers() {
        let diff = unified_diff("f.md", "a\n", "b\n").unwrap();
        let text = render(&diff);
        assert!(text.starts_with("diff --git a/f.md b/f.md\n"));
        assert!(text.contains("--- a/f.md\n"));
        assert!(text.contains("+++ b/f.md\n"));
        assert!(text.contains("@@ -1,1 +1,1 @@\n"));
    }

    #[test]
    fn render_matches_expected_hunk_body() {
        use pretty_assertions::assert_eq;

        let diff = unified_diff("f.md", "one\ntwo\nthree\n", "one\nTWO\nthree\n").unwrap();
        let text = render(&diff);
        let expected = "diff --git a/f.md b/f.md\n\
                         --- a/f.md\n\
                         +++ b/f.md\n\
                         @@ -1,3 +1,3 @@\n\
                          one\n\
                         -two\n\
                         +TWO\n\
                          three\n";
        assert_eq!(text, expected);
    }
}
