//! Legacy IRC-style names listing.
//!
//! Older clients receive the online identities as `~admin @mod +sub plain`
//! style lines. Each line is bounded so it fits a single protocol message.

/// Character budget for one line of the names listing.
pub const DEFAULT_NAMES_LINE_BUDGET: usize = 400;

/// Pack prefixed names into lines of at most `budget` characters.
///
/// Names within a line are joined by a single space, which counts towards
/// the budget. Packing is greedy, so the number of lines is minimal for the
/// given order. A name longer than the budget gets a line of its own.
pub fn chunk_names<I>(names: I, budget: usize) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = String>,
{
    let mut lines = Vec::new();
    let mut line: Vec<String> = Vec::new();
    let mut width = 0;

    for name in names {
        let len = name.chars().count();
        if line.is_empty() {
            width = len;
        } else if width + 1 + len > budget {
            lines.push(std::mem::take(&mut line));
            width = len;
        } else {
            width += 1 + len;
        }
        line.push(name);
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(count: usize, len: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("{:0width$}", i, width = len))
            .collect()
    }

    #[test]
    fn test_empty_listing() {
        assert!(chunk_names(Vec::new(), DEFAULT_NAMES_LINE_BUDGET).is_empty());
    }

    #[test]
    fn test_single_line_keeps_all_names() {
        let lines = chunk_names(vec!["~root".into(), "@mod".into(), "bob".into()], 400);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].join(" "), "~root @mod bob");
    }

    #[test]
    fn test_lines_respect_budget_and_are_minimal() {
        // 100 names of 9 chars: 40 fit in a line (40 * 9 + 39 = 399).
        let input = names(100, 9);
        let lines = chunk_names(input.clone(), 400);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 40);
        assert_eq!(lines[1].len(), 40);
        assert_eq!(lines[2].len(), 20);
        for line in &lines {
            assert!(line.join(" ").chars().count() <= 400);
        }
        let flattened: Vec<String> = lines.into_iter().flatten().collect();
        assert_eq!(flattened, input);
    }

    #[test]
    fn test_exact_fit() {
        // 10 names of 39 chars plus 9 spaces = 399, an 11th would overflow.
        let lines = chunk_names(names(11, 39), 399);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].join(" ").len(), 399);
    }

    #[test]
    fn test_oversized_name_gets_own_line() {
        let long = "x".repeat(450);
        let lines = chunk_names(vec!["a".into(), long.clone(), "b".into()], 400);
        assert_eq!(lines, vec![vec!["a".to_string()], vec![long], vec!["b".to_string()]]);
    }

    #[test]
    fn test_budget_counts_characters() {
        // Multi-byte nicks are measured in characters, not bytes.
        let lines = chunk_names(vec!["ñññ".into(), "üüü".into()], 7);
        assert_eq!(lines.len(), 1);
    }
}
