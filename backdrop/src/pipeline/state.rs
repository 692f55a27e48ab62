//! Pipeline state and the structured outputs the model is asked for.
//!
//! Each stage writes its own field once; `history_info` is the only write-many field
//! and is merged by concatenation, so its order reflects task completion order and
//! must not be relied on.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::channels::{boxed_updater, BoxedStateUpdater, FieldBasedUpdater};
use crate::fetch::Document;
use crate::llm::{OutputSchema, StructuredOutput};

/// Search queries generated for the original document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchQueries {
    pub queries: Vec<String>,
}

impl SearchQueries {
    /// Keeps at most `n` queries.
    pub fn truncated(mut self, n: usize) -> Self {
        self.queries.truncate(n);
        self
    }
}

impl StructuredOutput for SearchQueries {
    fn output_schema() -> OutputSchema {
        OutputSchema::new(
            "search_queries",
            json!({
                "type": "object",
                "properties": {
                    "queries": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Search engine queries"
                    }
                },
                "required": ["queries"],
                "additionalProperties": false
            }),
        )
        .with_description("Search queries about the events preceding a document")
    }
}

/// One related article, as summarized by the model. Times are free-form text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryItem {
    pub event_time: String,
    pub publish_time: String,
    pub title: String,
    pub summary: String,
    pub source_url: String,
}

impl StructuredOutput for HistoryItem {
    fn output_schema() -> OutputSchema {
        OutputSchema::new(
            "history_item",
            json!({
                "type": "object",
                "properties": {
                    "event_time": {
                        "type": "string",
                        "description": "When the main event happened (not the publication time)"
                    },
                    "publish_time": {
                        "type": "string",
                        "description": "When the article was published"
                    },
                    "title": { "type": "string", "description": "Title of the article" },
                    "summary": { "type": "string", "description": "Concise summary of the article" },
                    "source_url": { "type": "string", "description": "URL of the article" }
                },
                "required": ["event_time", "publish_time", "title", "summary", "source_url"],
                "additionalProperties": false
            }),
        )
        .with_description("Event time, publication time and summary of one article")
    }
}

/// Record threaded through every stage of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_doc: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_queries: Option<SearchQueries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_urls: Option<Vec<String>>,
    #[serde(default)]
    pub history_info: Vec<HistoryItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_summary: Option<String>,
}

impl PipelineState {
    /// Initial state for a run.
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Discovered URLs, empty before discovery ran.
    pub fn urls(&self) -> &[String] {
        self.history_urls.as_deref().unwrap_or(&[])
    }

    /// Merges a stage's partial output: `Some` fields and a non-empty `url` replace,
    /// `history_info` is appended.
    pub fn merge(&mut self, update: &PipelineState) {
        if !update.url.is_empty() {
            self.url = update.url.clone();
        }
        if update.original_doc.is_some() {
            self.original_doc = update.original_doc.clone();
        }
        if update.history_queries.is_some() {
            self.history_queries = update.history_queries.clone();
        }
        if update.history_urls.is_some() {
            self.history_urls = update.history_urls.clone();
        }
        self.history_info.extend(update.history_info.iter().cloned());
        if update.history_summary.is_some() {
            self.history_summary = update.history_summary.clone();
        }
    }
}

/// Graph updater for [`PipelineState`]: see [`PipelineState::merge`].
pub fn pipeline_updater() -> BoxedStateUpdater<PipelineState> {
    boxed_updater(FieldBasedUpdater::new(
        |current: &mut PipelineState, update: &PipelineState| current.merge(update),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str) -> HistoryItem {
        HistoryItem {
            event_time: "2023".into(),
            publish_time: "2024-01-02".into(),
            title: "t".into(),
            summary: "s".into(),
            source_url: url.into(),
        }
    }

    /// **Scenario**: Partial updates keep untouched fields; history_info concatenates.
    #[test]
    fn merge_keeps_unset_fields_and_appends_history() {
        let mut state = PipelineState::seed("https://example.com/article");
        state.history_urls = Some(vec!["https://a".into()]);

        state.merge(&PipelineState {
            history_info: vec![item("https://a")],
            ..PipelineState::default()
        });
        state.merge(&PipelineState {
            history_info: vec![item("https://b")],
            ..PipelineState::default()
        });

        assert_eq!(state.url, "https://example.com/article");
        assert_eq!(state.urls(), &["https://a".to_string()]);
        assert_eq!(state.history_info.len(), 2);
    }

    #[test]
    fn merge_through_updater_sets_summary() {
        let updater = pipeline_updater();
        let mut state = PipelineState::seed("u");
        updater.apply_update(
            &mut state,
            &PipelineState {
                history_summary: Some("done".into()),
                ..PipelineState::default()
            },
        );
        assert_eq!(state.history_summary.as_deref(), Some("done"));
        assert_eq!(state.url, "u");
    }

    #[test]
    fn search_queries_truncated() {
        let q = SearchQueries {
            queries: (0..8).map(|i| format!("q{}", i)).collect(),
        };
        assert_eq!(q.clone().truncated(5).queries.len(), 5);
        assert_eq!(q.truncated(20).queries.len(), 8);
    }

    /// **Scenario**: History items reject missing and unknown fields.
    #[test]
    fn history_item_deserialization_is_strict() {
        let ok = json!({
            "event_time": "2023", "publish_time": "2024", "title": "t",
            "summary": "s", "source_url": "https://a"
        });
        assert!(serde_json::from_value::<HistoryItem>(ok.clone()).is_ok());

        let mut missing = ok.clone();
        missing.as_object_mut().unwrap().remove("publish_time");
        assert!(serde_json::from_value::<HistoryItem>(missing).is_err());

        let mut extra = ok;
        extra.as_object_mut().unwrap().insert("author".into(), json!("x"));
        assert!(serde_json::from_value::<HistoryItem>(extra).is_err());
    }

    /// **Scenario**: Strict schemas list every property as required and forbid extras.
    #[test]
    fn schemas_are_strict_compatible() {
        for schema in [SearchQueries::output_schema(), HistoryItem::output_schema()] {
            assert!(schema.strict);
            let props = schema.schema["properties"].as_object().unwrap();
            let required: Vec<&str> = schema.schema["required"]
                .as_array()
                .unwrap()
                .iter()
                .filter_map(|v| v.as_str())
                .collect();
            assert_eq!(props.len(), required.len(), "{}", schema.name);
            assert!(props.keys().all(|k| required.contains(&k.as_str())));
            assert_eq!(schema.schema["additionalProperties"], json!(false));
        }
    }

    #[test]
    fn state_json_omits_unset_fields() {
        let js = serde_json::to_value(PipelineState::seed("u")).unwrap();
        assert_eq!(js, json!({ "url": "u", "history_info": [] }));
    }
}
