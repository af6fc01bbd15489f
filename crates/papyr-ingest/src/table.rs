//! Table inference from extracted text.

use papyr_core::InferredTable;

/// Split text into rows (non-blank lines) and cells (whitespace-separated tokens).
///
/// Ragged rows are kept as they are; nothing is padded or merged.
pub fn infer_table(text: &str) -> InferredTable {
    let rows = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect();

    InferredTable::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(text: &str) -> Vec<Vec<String>> {
        infer_table(text).rows
    }

    #[test]
    fn test_blank_lines_dropped_and_rows_ragged() {
        assert_eq!(
            rows("a b\nc\n\nd e f"),
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()],
                vec!["d".to_string(), "e".to_string(), "f".to_string()],
            ]
        );
    }

    #[test]
    fn test_whitespace_runs_and_tabs() {
        assert_eq!(
            rows("  Total\t\t 12.50  \r\n"),
            vec![vec!["Total".to_string(), "12.50".to_string()]]
        );
    }

    #[test]
    fn test_no_content_gives_no_rows() {
        assert!(infer_table("").is_empty());
        assert!(infer_table("\n   \n\t\n").is_empty());
    }

    #[test]
    fn test_inference_is_deterministic() {
        let text = "Item Qty Price\nCoffee 2 3.50\n\nTotal 7.00";
        assert_eq!(infer_table(text), infer_table(text));
        assert_eq!(infer_table(text).row_count(), 3);
        assert_eq!(infer_table(text).max_columns(), 3);
    }
}
