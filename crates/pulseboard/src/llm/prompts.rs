//! Prompt templates for insight requests.

use std::fmt::Write as _;

use crate::dataset::Dataset;
use crate::summary::DatasetSummary;

/// Heading that names the task in every prompt.
pub const TASK_INSIGHTS: &str = "## Task: insights";
pub const TASK_QUESTION: &str = "## Task: question";
pub const TASK_CHART_TYPE: &str = "## Task: chart type";
pub const TASK_DESCRIPTIONS: &str = "## Task: column descriptions";

/// Describe a dataset for the model: name, size, columns, summary and a
/// few sample rows.
pub fn dataset_context(dataset: &Dataset, sample_rows: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "## Dataset");
    let _ = writeln!(out, "- Name: {}", dataset.name());
    let _ = writeln!(out, "- Rows: {}", dataset.row_count());
    let _ = writeln!(out);

    let _ = writeln!(out, "## Columns");
    for (name, meta) in dataset.meta() {
        if meta.description.is_empty() {
            let _ = writeln!(out, "- {} ({})", name, meta.column_type);
        } else {
            let _ = writeln!(out, "- {} ({}): {}", name, meta.column_type, meta.description);
        }
    }
    let _ = writeln!(out);

    let summary = DatasetSummary::compute(dataset.meta(), dataset.normalized());
    let _ = writeln!(out, "## Summary");
    out.push_str(&summary.to_text());
    let _ = writeln!(out);

    let _ = writeln!(out, "## Sample Rows");
    let samples: Vec<String> = dataset
        .rows()
        .iter()
        .take(sample_rows)
        .filter_map(|row| serde_json::to_string(row).ok())
        .collect();
    if samples.is_empty() {
        let _ = writeln!(out, "No rows available");
    } else {
        for sample in samples {
            let _ = writeln!(out, "{}", sample);
        }
    }

    out
}

/// Ask for a short set of business insights.
pub fn insights_prompt(context: &str) -> String {
    format!(
        r#"{context}
{TASK_INSIGHTS}
Give 3-5 concise insights about this dataset for a business audience.
Point out trends, standout values and anything that looks off.
Respond with a short bulleted list in plain text."#
    )
}

/// Ask a free-form question about the dataset.
pub fn question_prompt(context: &str, question: &str) -> String {
    format!(
        r#"{context}
{TASK_QUESTION}
Answer the user's question using only the data described above.
If the data cannot answer it, say so.

Question: {question}"#
    )
}

/// Ask for the best chart type.
pub fn chart_type_prompt(context: &str) -> String {
    format!(
        r#"{context}
{TASK_CHART_TYPE}
Which chart type best presents this dataset?
Answer with exactly one word: bar, line, area, pie or scatter."#
    )
}

/// Ask for one-line column descriptions.
pub fn descriptions_prompt(context: &str) -> String {
    format!(
        r#"{context}
{TASK_DESCRIPTIONS}
Write a description of at most 60 characters for each column.

Respond with a JSON object mapping column name to description:
{{
  "column_name": "What the column holds"
}}"#
    )
}

/// Build the system prompt.
pub fn system_prompt() -> &'static str {
    r#"You are a data analyst assistant for Pulseboard, an analytics dashboard.

Your role is to:
1. Summarize tabular business data in plain language
2. Answer questions about the data that is provided
3. Recommend how to visualize it

Guidelines:
- Be concise and specific
- Reference actual values from the summary and sample rows
- Never invent columns or figures that are not in the context
- Always respond with valid JSON when requested"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ImportDraft;
    use crate::input::Parser;
    use crate::schema::ColumnType;

    fn dataset() -> Dataset {
        let csv = "month,revenue\nJan,100\nFeb,200\nMar,300\nApr,400\nMay,500\nJun,600\n";
        let (table, source) = Parser::new()
            .parse_bytes("sales.csv", csv.as_bytes(), None)
            .unwrap();
        let mut draft = ImportDraft::new(table, source);
        draft.set_description("revenue", "Monthly revenue").unwrap();
        draft.set_column_type("month", ColumnType::String).unwrap();
        draft.commit()
    }

    #[test]
    fn test_context_lists_columns_and_samples() {
        let context = dataset_context(&dataset(), 5);

        assert!(context.contains("- Name: sales"));
        assert!(context.contains("- Rows: 6"));
        assert!(context.contains("- month (string)"));
        assert!(context.contains("- revenue (number): Monthly revenue"));
        assert!(context.contains("- revenue: min 100, max 600"));
        assert!(context.contains(r#"{"month":"Jan","revenue":100.0}"#));
        assert!(!context.contains(r#""Jun""#));
    }

    #[test]
    fn test_task_prompts_carry_markers() {
        let context = "ctx";
        assert!(insights_prompt(context).contains(TASK_INSIGHTS));
        assert!(question_prompt(context, "Why?").ends_with("Question: Why?"));
        assert!(chart_type_prompt(context).contains(TASK_CHART_TYPE));
        assert!(descriptions_prompt(context).contains(TASK_DESCRIPTIONS));
    }
}
