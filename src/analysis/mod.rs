//! Model-backed document operations: segmentation, simplification, rights
//! detection, translation, and transcript summarization.
//!
//! Each operation builds a prompt, asks the generative provider for a
//! completion, and recovers structured output through the normalizer. The
//! structured operations never fail: upstream errors and unparsable output
//! both resolve to the operation's deterministic fallback. Translation and
//! summarization return raw text and surface upstream errors, since there
//! is no sensible fallback for them.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generate::GenerativeProvider;
use crate::normalizer::{recover_or, Shape};

/// One logical section of a legal document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedDocument {
    pub title: String,
    pub sections: Vec<Section>,
}

/// Plain-language rendering of a piece of legal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simplification {
    pub plain_summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub ambiguous_terms: Vec<String>,
    #[serde(default)]
    pub readability_note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRight {
    pub right_name: String,
    pub plain_explanation: String,
    #[serde(default)]
    pub location_in_doc: String,
    #[serde(default)]
    pub disclaimer: String,
}

pub struct Analyzer {
    provider: Box<dyn GenerativeProvider>,
    max_prompt_chars: usize,
}

impl Analyzer {
    pub fn new(provider: Box<dyn GenerativeProvider>, max_prompt_chars: usize) -> Self {
        Self {
            provider,
            max_prompt_chars,
        }
    }

    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    /// Segment a document into titled sections. Falls back to a single
    /// "Full Document" section when the model output cannot be recovered.
    pub async fn segment(&self, text: &str) -> SegmentedDocument {
        let excerpt = truncate_chars(text, self.max_prompt_chars);
        let prompt = segmentation_prompt(excerpt);

        let raw = match self.provider.complete(&prompt, 4000).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Segmentation call failed, using fallback: {:#}", err);
                return segment_fallback(text);
            }
        };

        recover_or(&raw, Shape::Object, segment_fallback(text))
    }

    /// Simplify legal text to plain language. Falls back to a fixed
    /// placeholder record.
    pub async fn simplify(&self, text: &str) -> Simplification {
        let prompt = simplification_prompt(truncate_chars(text, self.max_prompt_chars));

        let raw = match self.provider.complete(&prompt, 2000).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Simplification call failed, using fallback: {:#}", err);
                return simplify_fallback();
            }
        };

        recover_or(&raw, Shape::Object, simplify_fallback())
    }

    /// Detect citizen/defendant rights mentioned in the document. Falls
    /// back to an empty list.
    pub async fn detect_rights(&self, text: &str) -> Vec<DetectedRight> {
        let prompt = rights_prompt(truncate_chars(text, self.max_prompt_chars));

        let raw = match self.provider.complete(&prompt, 3000).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Rights detection call failed, using fallback: {:#}", err);
                return Vec::new();
            }
        };

        recover_or(&raw, Shape::Array, Vec::new())
    }

    /// Translate text into the target language. Upstream failure surfaces
    /// to the caller: translation is the sole purpose of its request.
    pub async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let prompt = translation_prompt(text, target_language);
        let raw = self.provider.complete(&prompt, 2000).await?;
        Ok(raw.trim().to_string())
    }

    /// Summarize a courtroom transcript. Surfaces upstream failure like
    /// [`Analyzer::translate`].
    pub async fn summarize_transcript(&self, transcript: &str) -> Result<String> {
        let prompt = summary_prompt(truncate_chars(transcript, self.max_prompt_chars));
        let raw = self.provider.complete(&prompt, 1000).await?;
        Ok(raw.trim().to_string())
    }
}

fn segment_fallback(text: &str) -> SegmentedDocument {
    SegmentedDocument {
        title: "Legal Document".to_string(),
        sections: vec![Section {
            heading: "Full Document".to_string(),
            body: truncate_chars(text, 5000).to_string(),
        }],
    }
}

fn simplify_fallback() -> Simplification {
    Simplification {
        plain_summary: "This section could not be simplified".to_string(),
        key_points: Vec::new(),
        ambiguous_terms: Vec::new(),
        readability_note: "Processing failed".to_string(),
    }
}

/// Truncate on a char boundary; slicing by byte index would panic on
/// multi-byte text.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

fn segmentation_prompt(text: &str) -> String {
    format!(
        r#"Analyze this legal document and break it into logical sections.
For each section, identify:
1. A heading/title (if present, otherwise generate one)
2. The body text

Return ONLY a valid JSON object in this exact format:
{{
  "title": "Document title or Bill number",
  "sections": [
    {{
      "heading": "Section title",
      "body": "Section content"
    }}
  ]
}}

Document text:
{text}
"#
    )
}

fn simplification_prompt(text: &str) -> String {
    format!(
        r#"Convert this legal text into plain language at an 8th-grade reading level.

Legal text:
{text}

Provide your response in this JSON format:
{{
  "plain_summary": "Simple explanation of what this section means",
  "key_points": ["Point 1", "Point 2", "Point 3"],
  "ambiguous_terms": ["term1: explanation", "term2: explanation"],
  "readability_note": "Brief note on complexity"
}}

Keep explanations clear, concise, and accessible to non-lawyers."#
    )
}

fn rights_prompt(text: &str) -> String {
    format!(
        r#"Analyze this legal document and identify any citizen/defendant rights mentioned.
Common rights include: right to counsel, right to remain silent, right to a translator,
right to appeal, right to a speedy trial, etc.

Document:
{text}

Return ONLY a valid JSON array in this format:
[
  {{
    "right_name": "Right to Counsel",
    "plain_explanation": "You have the right to have a lawyer represent you in court. If you cannot afford one, the court may provide one for you.",
    "location_in_doc": "Section 2, Paragraph 1",
    "disclaimer": "This is general information, not legal advice. Consult with a qualified attorney for legal advice specific to your situation."
  }}
]

If no rights are explicitly mentioned, return an empty array: []"#
    )
}

fn translation_prompt(text: &str, target_language: &str) -> String {
    format!(
        r#"Translate the following text to {target_language}.
Maintain the legal meaning and tone. Be accurate and clear.

Text to translate:
{text}

Provide ONLY the translation, no explanations or additional text."#
    )
}

fn summary_prompt(transcript: &str) -> String {
    format!(
        r#"Here is the transcript of a courtroom session:

{transcript}

Please provide a summary including key events: who spoke, objections, rulings, and main arguments."#
    )
}
