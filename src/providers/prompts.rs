//! Prompt templates shared by both providers.

/// System role for chat-style providers.
pub const SYSTEM_PROMPT: &str = "You are a professional data analyst. \
Give concise, informative conclusions about the data you are shown.";

/// Prefix every provider attaches to the payload it sends.
pub const ANALYSIS_PREFIX: &str = "Analyze the following data:\n";

/// Template for row-sample analysis ({rows} and {table} placeholders).
const FIRST_ROWS_PROMPT: &str = "Analyze the first {rows} rows of this table. \
Point out anomalies, trends, and notable features of the data.\n\n{table}";

/// Build the prompt for a row-sample analysis.
///
/// The requested row count goes into the text even when the table holds
/// fewer rows; the sample itself is whatever the caller rendered.
pub fn first_rows_prompt(rows_count: usize, rendered_table: &str) -> String {
    FIRST_ROWS_PROMPT
        .replace("{rows}", &rows_count.to_string())
        .replace("{table}", rendered_table)
}
