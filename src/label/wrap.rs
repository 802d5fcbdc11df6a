use crate::text_metrics::{MeasureError, MeasureText};

const ELLIPSIS: &str = "...";

/// Greedy word wrap bounded by measured pixel width: a word joins the
/// current line if the joined line still fits, otherwise it starts a
/// new one. A single word wider than `max_width` is kept whole. Output
/// is capped at `max_lines`; when words remain unconsumed the last
/// retained line is shortened and suffixed with an ellipsis.
///
/// Empty or whitespace-only titles yield one line equal to the trimmed
/// input, so callers always get at least one line back.
pub fn wrap_title<M: MeasureText>(
    measurer: &mut M,
    title: &str,
    font_size: f32,
    max_width: f32,
    max_lines: usize,
) -> Result<Vec<String>, MeasureError> {
    let max_lines = max_lines.max(1);
    let mut words = title.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(vec![title.trim().to_string()]);
    };

    let mut lines: Vec<String> = Vec::new();
    let mut current = first.to_string();
    for word in words {
        let candidate = format!("{current} {word}");
        if measurer.measure_text(&candidate, font_size)? < max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    lines.push(current);

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = truncate_with_ellipsis(last);
        }
    }
    Ok(lines)
}

fn truncate_with_ellipsis(line: &str) -> String {
    let keep = line.chars().count().saturating_sub(ELLIPSIS.len());
    let mut out: String = line.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::CharTableMeasurer;

    fn wrap(title: &str, max_width: f32, max_lines: usize) -> Vec<String> {
        let mut measurer = CharTableMeasurer;
        wrap_title(&mut measurer, title, 12.0, max_width, max_lines).unwrap()
    }

    #[test]
    fn short_title_is_a_single_unchanged_line() {
        assert_eq!(wrap("Heat", 1000.0, 2), vec!["Heat"]);
    }

    #[test]
    fn empty_title_yields_single_empty_line() {
        assert_eq!(wrap("", 100.0, 2), vec![""]);
        assert_eq!(wrap("   ", 100.0, 2), vec![""]);
    }

    #[test]
    fn long_title_wraps_at_word_boundaries() {
        // Width fits roughly two words per line at this font size.
        let lines = wrap("The Quick Brown Fox Jumps", 80.0, 4);
        assert!(lines.len() >= 2, "expected wrapping, got {lines:?}");
        for line in &lines {
            assert!(!line.starts_with(' ') && !line.ends_with(' '));
        }
    }

    #[test]
    fn overflow_is_capped_with_ellipsis() {
        let lines = wrap("The Quick Brown Fox Jumps", 80.0, 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("..."), "got {:?}", lines[1]);
    }

    #[test]
    fn single_wide_word_is_not_split() {
        let lines = wrap("Incomprehensibilities", 10.0, 2);
        assert_eq!(lines, vec!["Incomprehensibilities"]);
    }

    #[test]
    fn exactly_max_lines_keeps_last_line_intact() {
        // "Alpha Beta" / "Gamma" at a width fitting two short words.
        let lines = wrap("Alpha Beta Gamma", 85.0, 2);
        assert_eq!(lines.len(), 2);
        assert!(!lines[1].ends_with("..."), "got {:?}", lines[1]);
    }
}
