//! Whole-field term highlighting
//!
//! Fields are re-tokenized with the analyzer the index uses, and every token
//! matching a query term is wrapped in the highlight markers. Highlighting is
//! independent of which field actually matched the query.

use crate::models::Message;
use crate::search::query::{HighlightSpec, ATTACHMENTS_TEXT_FIELD, TEXT_FIELD};
use std::collections::{HashMap, HashSet};
use tantivy::tokenizer::{TextAnalyzer, TokenStream};

const OPERATORS: [&str; 3] = ["AND", "OR", "NOT"];

pub struct Highlighter {
    analyzer: TextAnalyzer,
    terms: HashSet<String>,
    spec: HighlightSpec,
}

impl Highlighter {
    /// Returns `None` when the query has no highlightable terms
    pub fn new(mut analyzer: TextAnalyzer, query: &str, spec: HighlightSpec) -> Option<Self> {
        let cleaned = query
            .split_whitespace()
            .filter(|word| !OPERATORS.contains(word))
            // Drop field prefixes such as `text:`
            .map(|word| word.rsplit(':').next().unwrap_or(word))
            .collect::<Vec<_>>()
            .join(" ");

        let mut terms = HashSet::new();
        {
            let mut stream = analyzer.token_stream(&cleaned);
            while stream.advance() {
                terms.insert(stream.token().text.clone());
            }
        }

        if terms.is_empty() {
            return None;
        }

        Some(Self {
            analyzer,
            terms,
            spec,
        })
    }

    /// Wrap every matching token of `text`; `None` if nothing matched
    pub fn highlight(&mut self, text: &str) -> Option<String> {
        let mut output = String::with_capacity(text.len() + 16);
        let mut last = 0;
        let mut matched = false;

        let mut stream = self.analyzer.token_stream(text);
        while stream.advance() {
            let token = stream.token();
            if token.offset_from < last || !self.terms.contains(&token.text) {
                continue;
            }

            output.push_str(&text[last..token.offset_from]);
            output.push_str(&self.spec.pre_tag);
            output.push_str(&text[token.offset_from..token.offset_to]);
            output.push_str(&self.spec.post_tag);
            last = token.offset_to;
            matched = true;
        }

        if !matched {
            return None;
        }

        output.push_str(&text[last..]);
        Some(output)
    }

    /// Highlight fragments for every requested field of `message`.
    ///
    /// Attachment fragments are emitted only for attachments that contain a
    /// hit, in attachment order, so fragment N is not necessarily attachment N.
    pub fn highlight_message(&mut self, message: &Message) -> HashMap<String, Vec<String>> {
        let mut highlights = HashMap::new();

        if self.spec.fields.iter().any(|f| f == TEXT_FIELD) {
            if let Some(fragment) = self.highlight(&message.text) {
                highlights.insert(TEXT_FIELD.to_string(), vec![fragment]);
            }
        }

        if self.spec.fields.iter().any(|f| f == ATTACHMENTS_TEXT_FIELD) {
            let fragments: Vec<String> = message
                .attachment_texts()
                .filter_map(|text| self.highlight(text))
                .collect();

            if !fragments.is_empty() {
                highlights.insert(ATTACHMENTS_TEXT_FIELD.to_string(), fragments);
            }
        }

        highlights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attachment;
    use tantivy::tokenizer::{LowerCaser, SimpleTokenizer};

    fn analyzer() -> TextAnalyzer {
        TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .build()
    }

    #[test]
    fn test_highlight_wraps_matching_tokens() {
        let mut highlighter =
            Highlighter::new(analyzer(), "deploy", HighlightSpec::default()).unwrap();

        assert_eq!(
            highlighter.highlight("Deploy failed, retry deploy").as_deref(),
            Some("[hl]Deploy[/hl] failed, retry [hl]deploy[/hl]")
        );
        assert_eq!(highlighter.highlight("nothing here"), None);
    }

    #[test]
    fn test_operators_are_not_terms() {
        let mut highlighter =
            Highlighter::new(analyzer(), "deploy AND text:failed", HighlightSpec::default())
                .unwrap();

        assert_eq!(
            highlighter.highlight("and the deploy failed").as_deref(),
            Some("and the [hl]deploy[/hl] [hl]failed[/hl]")
        );
    }

    #[test]
    fn test_empty_query_has_no_highlighter() {
        assert!(Highlighter::new(analyzer(), "  AND ", HighlightSpec::default()).is_none());
    }

    #[test]
    fn test_attachment_fragments_skip_unmatched() {
        let message = Message {
            text: "plain".to_string(),
            attachments: vec![
                Attachment {
                    text: "unrelated".to_string(),
                    ..Default::default()
                },
                Attachment {
                    text: "deploy log".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let mut highlighter =
            Highlighter::new(analyzer(), "deploy", HighlightSpec::default()).unwrap();
        let highlights = highlighter.highlight_message(&message);

        assert!(!highlights.contains_key("text"));
        assert_eq!(
            highlights["attachments.text"],
            vec!["[hl]deploy[/hl] log".to_string()]
        );
    }
}
