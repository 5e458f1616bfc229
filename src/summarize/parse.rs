use crate::summarize::Summary;

const MAX_MAIN_POINTS: usize = 3;
const MAX_TECHNICAL_DETAILS: usize = 2;
const MAX_IMPLICATIONS: usize = 2;

/// Parses free-form completion text into a [`Summary`]
///
/// The first non-empty line becomes the title. Among the remaining lines:
/// `"- "` starts a main point, `"*"` starts a technical detail, and any line
/// mentioning "implication" is kept whole as an implication. Each list is
/// capped (3, 2 and 2 entries). A line is assigned to the first rule that
/// matches it.
///
/// ```
/// use defcon_archiver::summarize::parse_completion;
///
/// let summary = parse_completion("Title\n- point\n* detail\nImplications: big");
/// assert_eq!(summary.title, "Title");
/// assert_eq!(summary.main_points, vec!["point"]);
/// assert_eq!(summary.technical_details, vec!["detail"]);
/// assert_eq!(summary.implications, vec!["Implications: big"]);
/// ```
pub fn parse_completion(text: &str) -> Summary {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let mut summary = Summary {
        title: lines.next().unwrap_or_default().to_string(),
        ..Summary::default()
    };

    for line in lines {
        if let Some(point) = line.strip_prefix("- ") {
            if summary.main_points.len() < MAX_MAIN_POINTS {
                summary.main_points.push(point.trim().to_string());
            }
        } else if let Some(detail) = line.strip_prefix('*') {
            if summary.technical_details.len() < MAX_TECHNICAL_DETAILS {
                summary.technical_details.push(detail.trim_start().to_string());
            }
        } else if line.to_lowercase().contains("implication")
            && summary.implications.len() < MAX_IMPLICATIONS
        {
            summary.implications.push(line.to_string());
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_completion() {
        let summary = parse_completion("");
        assert_eq!(summary.title, "");
        assert!(summary.main_points.is_empty());
        assert!(summary.technical_details.is_empty());
        assert!(summary.implications.is_empty());
    }

    #[test]
    fn test_title_skips_leading_blank_lines() {
        let summary = parse_completion("\n\n   Breaking TLS  \n- a");
        assert_eq!(summary.title, "Breaking TLS");
        assert_eq!(summary.main_points, vec!["a"]);
    }

    #[test]
    fn test_caps_each_list() {
        let text = "T\n- 1\n- 2\n- 3\n- 4\n* a\n* b\n* c\nimplication x\nImplication y\nIMPLICATION z";
        let summary = parse_completion(text);
        assert_eq!(summary.main_points, vec!["1", "2", "3"]);
        assert_eq!(summary.technical_details, vec!["a", "b"]);
        assert_eq!(summary.implications, vec!["implication x", "Implication y"]);
    }

    #[test]
    fn test_star_without_space() {
        let summary = parse_completion("T\n*heap spray");
        assert_eq!(summary.technical_details, vec!["heap spray"]);
    }

    #[test]
    fn test_title_line_is_not_classified() {
        let summary = parse_completion("- Implications of fuzzing\n- point");
        assert_eq!(summary.title, "- Implications of fuzzing");
        assert_eq!(summary.main_points, vec!["point"]);
        assert!(summary.implications.is_empty());
    }

    #[test]
    fn test_unmatched_lines_are_dropped() {
        let summary = parse_completion("Title\nplain prose\nmore prose");
        assert_eq!(summary.title, "Title");
        assert!(summary.main_points.is_empty());
        assert!(summary.technical_details.is_empty());
        assert!(summary.implications.is_empty());
    }

    #[test]
    fn test_bulleted_implication_is_a_main_point() {
        let summary = parse_completion("T\n- implication for vendors");
        assert_eq!(summary.main_points, vec!["implication for vendors"]);
        assert!(summary.implications.is_empty());
    }
}
