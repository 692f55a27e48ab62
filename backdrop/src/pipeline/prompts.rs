//! Prompt text for the three model calls of a run.

use crate::fetch::Document;

use super::state::HistoryItem;

/// `{top_n}` is replaced with the query bound.
const QUERY_SYSTEM_PROMPT: &str = "You will be given a document. Your task is to generate up to {top_n} search queries that can help find information about events preceding the document. Specifically, the queries should aim to:
1. Explain what happened before the events described in the document.
2. Identify the precedents of the events in the document.
3. Determine the causes of the events in the document.
4. Find the historical context of the events in the document.";

const EXTRACT_SYSTEM_PROMPT: &str = "You will be given a document, and your task is to extract the following information:
1. The time the main event happened. This is not the publication time, only the event's time.
2. The time the article was published. This is not the event's time.
3. The title of the article.
4. A concise summary of the document.
5. The URL of the document, as given in its source line.";

/// `{max_sources}` is replaced with the source bound.
const SUMMARY_SYSTEM_PROMPT: &str = "You will be given an original document along with a list of historical documents related to it. Your task is to write a summary that explains the historical context to help understand the event described in the original document. You may use up to {max_sources} of the most related and important documents to write the summary. At the end of the summary, include the URLs of the sources you used, which are provided in the documents.";

pub fn query_system_prompt(top_n: usize) -> String {
    QUERY_SYSTEM_PROMPT.replace("{top_n}", &top_n.to_string())
}

pub fn extract_system_prompt() -> &'static str {
    EXTRACT_SYSTEM_PROMPT
}

pub fn summary_system_prompt(max_sources: usize) -> String {
    SUMMARY_SYSTEM_PROMPT.replace("{max_sources}", &max_sources.to_string())
}

/// User prompt carrying one document.
pub fn document_prompt(doc: &Document) -> String {
    format!("document:\n{}", doc.to_prompt())
}

/// User prompt for the summary: the original document and the history items as JSON.
pub fn summary_user_prompt(original: &Document, history: &[HistoryItem]) -> String {
    let items = serde_json::to_string_pretty(history).unwrap_or_else(|_| "[]".to_string());
    format!(
        "original document:\n{}\n\nhistory documents:\n{}",
        original.to_prompt(),
        items
    )
}
