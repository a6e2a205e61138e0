/// Prompt construction and reply parsing
///
/// The model is asked for a fixed plain-text layout:
///
/// ```text
/// Summary: <2-3 sentences>
/// Sentiment: <positive|neutral|negative|mixed>
/// Insights:
/// - <insight>
/// ```

use super::{Sentiment, SummarizeError, Summary};
use crate::models::Entry;

/// System message sent with every request
pub const SYSTEM_PROMPT: &str = "You are a thoughtful journal assistant. \
Summarize journal entries naturally, judge their overall sentiment and extract key themes.";

/// Used when the reply lists no insights
pub const NO_INSIGHTS: &str = "No specific insights extracted.";

const ENTRY_SEPARATOR: &str = "\n\n---\n\n";

/// Joins entries as `Title: ...` followed by the body
pub fn entries_text(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(|e| format!("Title: {}\n{}", e.title, e.content))
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

/// Builds the user message for `entries`
pub fn build_prompt(entries: &[Entry]) -> String {
    format!(
        "Analyze the following journal entries and provide:\n\
         1. A 2-3 sentence summary that paraphrases naturally and captures the main themes and emotions\n\
         2. The overall sentiment (positive, neutral, negative, mixed)\n\
         3. 2-3 key insights or patterns\n\
         \n\
         Journal entries:\n\
         {}\n\
         \n\
         Respond in this exact format:\n\
         Summary: [summary]\n\
         Sentiment: [sentiment]\n\
         Insights:\n\
         - [insight 1]\n\
         - [insight 2]\n\
         - [insight 3]",
        entries_text(entries)
    )
}

#[derive(PartialEq)]
enum Section {
    Preamble,
    Summary,
    Insights,
}

/// Parses a model reply
///
/// Summary text may wrap over several lines. A missing sentiment is
/// `Neutral`; missing insights become [`NO_INSIGHTS`].
///
/// # Errors
///
/// `Malformed` if no summary text is present.
pub fn parse_reply(reply: &str) -> Result<Summary, SummarizeError> {
    let mut summary_lines: Vec<&str> = Vec::new();
    let mut sentiment = Sentiment::Neutral;
    let mut insights = Vec::new();
    let mut section = Section::Preamble;

    for line in reply.lines().map(str::trim) {
        if let Some(rest) = strip_label(line, "Summary:") {
            section = Section::Summary;
            summary_lines.push(rest);
        } else if let Some(rest) = strip_label(line, "Sentiment:") {
            section = Section::Preamble;
            sentiment = Sentiment::from_label(rest);
        } else if let Some(rest) = strip_label(line, "Insights:") {
            section = Section::Insights;
            push_insight(&mut insights, rest);
        } else if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            push_insight(&mut insights, item);
        } else if section == Section::Summary {
            summary_lines.push(line);
        }
    }

    let summary = summary_lines
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if summary.is_empty() {
        return Err(SummarizeError::Malformed("reply has no summary".to_string()));
    }
    if insights.is_empty() {
        insights.push(NO_INSIGHTS.to_string());
    }

    Ok(Summary {
        summary,
        sentiment,
        insights,
    })
}

/// Case-insensitive label match; returns the trimmed remainder
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let line = line.trim_start_matches(['*', '#', ' ']);
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        Some(line[label.len()..].trim_start_matches('*').trim())
    } else {
        None
    }
}

fn push_insight(insights: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        insights.push(text.to_string());
    }
}
