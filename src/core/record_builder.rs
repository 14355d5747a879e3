use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::semantic::SemanticWalker;
use crate::core::synonyms::CompiledSynonyms;
use crate::core::tree::{DocumentTree, Parser, XmlTreeParser};
use crate::error::MalformedXmlError;
use crate::UniversalRecord;

/// How the record title is chosen when the root tag is not used verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleStrategy {
    /// Match the root tag against known notice-type signatures.
    #[default]
    Fingerprint,
    /// Take the first header whose key carries a document-title label.
    HeaderLabel,
}

/// Projects a parsed tree onto a `UniversalRecord`.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    synonyms: CompiledSynonyms,
    title_strategy: TitleStrategy,
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new(CompiledSynonyms::builtin().clone(), TitleStrategy::default())
    }
}

static DEFAULT_BUILDER: Lazy<RecordBuilder> = Lazy::new(RecordBuilder::default);

/// Parse and project one document with the built-in synonym table.
pub fn extract_record(text: &str) -> Result<UniversalRecord, MalformedXmlError> {
    DEFAULT_BUILDER.extract(text)
}

impl RecordBuilder {
    pub fn new(synonyms: CompiledSynonyms, title_strategy: TitleStrategy) -> Self {
        Self { synonyms, title_strategy }
    }

    pub fn synonyms(&self) -> &CompiledSynonyms {
        &self.synonyms
    }

    pub fn extract(&self, text: &str) -> Result<UniversalRecord, MalformedXmlError> {
        let tree = XmlTreeParser.parse(text)?;
        Ok(self.build(&tree))
    }

    pub fn build(&self, tree: &DocumentTree) -> UniversalRecord {
        let capture = SemanticWalker::new(&self.synonyms).run(&tree.root);

        let root_name = tree.root.name.as_str();
        let title = match self.title_strategy {
            TitleStrategy::Fingerprint => self.synonyms.fingerprint_title(root_name),
            TitleStrategy::HeaderLabel => capture
                .headers
                .iter()
                .find(|(key, _)| self.synonyms.title_labels.matches(key))
                .map(|(_, value)| value.as_str()),
        }
        .unwrap_or(root_name)
        .to_string();

        debug!(
            "record <{}>: title={:?}, {} headers, {} sections",
            root_name,
            title,
            capture.headers.len(),
            capture.sections.len()
        );

        UniversalRecord {
            title,
            fields: capture.fields,
            office_info: capture.office_info,
            headers: capture.headers,
            sections: capture.sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_root_is_its_own_title() {
        let record = extract_record("<Notice><A>1</A></Notice>").unwrap();
        assert_eq!(record.title, "Notice");
    }

    #[test]
    fn fingerprinted_root_gets_canonical_title() {
        let record = extract_record("<資格喪失確認通知書><A>1</A></資格喪失確認通知書>").unwrap();
        assert_eq!(record.title, "健康保険・厚生年金保険資格喪失確認通知書");
    }

    #[test]
    fn header_label_strategy_reads_title_from_headers() {
        let builder = RecordBuilder::new(CompiledSynonyms::builtin().clone(), TitleStrategy::HeaderLabel);
        let record = builder
            .extract("<Doc><Head><文書名>賞与支払届</文書名></Head></Doc>")
            .unwrap();
        assert_eq!(record.title, "賞与支払届");

        let fallback = builder.extract("<Doc><A>1</A></Doc>").unwrap();
        assert_eq!(fallback.title, "Doc");
    }

    #[test]
    fn parse_failure_is_propagated() {
        assert!(extract_record("<Notice>").is_err());
    }
}
