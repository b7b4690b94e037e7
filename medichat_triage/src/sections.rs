//! Naive section splitter for the detailed report's plain-text layout.
//!
//! The report prompt asks the model for `Section Name:` headers and dash
//! bullets with no markdown. Models don't always comply, so stray markdown
//! tokens are stripped before classifying each line.

use crate::report::TriageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Bullet(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub title: String,
    pub lines: Vec<ReportLine>,
}

/// Split report text into titled sections.
///
/// A trimmed, markdown-stripped line containing `:` that does not start
/// with `-` or `•` opens a new section (colons are dropped from the
/// title). Every other non-empty line accumulates into the current
/// section, dash lines as bullets. Lines before the first header are
/// discarded, matching the layout the prompt requests.
pub fn parse_sections(text: &str) -> Result<Vec<ReportSection>, TriageError> {
    let mut sections: Vec<ReportSection> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let line = line.replace("**", "").replace(['*', '#'], "");
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.contains(':') && !line.starts_with('-') && !line.starts_with('•') {
            sections.push(ReportSection {
                title: line.replace(':', "").trim().to_string(),
                lines: Vec::new(),
            });
        } else if let Some(current) = sections.last_mut() {
            let entry = line.strip_prefix('-').map_or_else(
                || ReportLine::Text(line.to_string()),
                |rest| ReportLine::Bullet(rest.trim().to_string()),
            );
            current.lines.push(entry);
        }
    }

    if sections.is_empty() {
        return Err(TriageError::NoSections);
    }
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Risk Level:
Low - symptoms are mild and recent

Key Symptoms:
- Sore throat
- Mild fever

Reassurance:
Your symptoms sound manageable at home.
Monitor for any changes.
";

    #[expect(clippy::unwrap_used, reason = "fixture text has sections")]
    fn parse(text: &str) -> Vec<ReportSection> {
        parse_sections(text).unwrap()
    }

    #[test]
    fn splits_on_colon_headers() {
        let sections = parse(SAMPLE);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title, "Risk Level");
        assert_eq!(sections[1].title, "Key Symptoms");
        assert_eq!(sections[2].title, "Reassurance");
    }

    #[test]
    fn classifies_bullets_and_text() {
        let sections = parse(SAMPLE);
        assert_eq!(
            sections[1].lines,
            vec![
                ReportLine::Bullet("Sore throat".to_string()),
                ReportLine::Bullet("Mild fever".to_string()),
            ]
        );
        assert_eq!(sections[2].lines.len(), 2);
        assert!(matches!(sections[2].lines[0], ReportLine::Text(_)));
    }

    #[test]
    fn strips_markdown_tokens() {
        let sections = parse("**Risk Level:**\n# Low overall\n- *mild* cough\n");
        assert_eq!(sections[0].title, "Risk Level");
        assert_eq!(
            sections[0].lines,
            vec![
                ReportLine::Text("Low overall".to_string()),
                ReportLine::Bullet("mild cough".to_string()),
            ]
        );
    }

    #[test]
    fn dash_lines_with_colons_stay_bullets() {
        let sections = parse("Monitoring Advice:\n- Temperature: check twice daily\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].lines,
            vec![ReportLine::Bullet("Temperature: check twice daily".to_string())]
        );
    }

    #[test]
    fn no_headers_at_all_is_an_error() {
        assert!(matches!(
            parse_sections("just prose\nwith no headers\n"),
            Err(TriageError::NoSections)
        ));
    }

    #[test]
    fn preamble_before_first_header_is_dropped() {
        let sections = parse("Here is your report.\nRisk Level:\nLow\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].lines, vec![ReportLine::Text("Low".to_string())]);
    }
}
