use serde::{Deserialize, Serialize};

use crate::Result;
use crate::load::NOT_AVAILABLE;
use crate::store::SearchResult;
use crate::translate::Translator;

/// Structured answer returned to the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// Narrative answer built from the best match
    pub main_answer: String,
    /// One entry per retrieved chunk, in relevance order
    pub legal_references: Vec<LegalReference>,
    pub helpful_links: Vec<String>,
    pub contact_info: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegalReference {
    pub category: String,
    /// Law names are proper nouns and never translated
    pub name: String,
    pub summary: String,
    pub when_applicable: String,
}

/// A piece of answer text, tagged with whether it may be translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub text: String,
    pub translatable: bool,
}

impl Field {
    fn fixed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translatable: false,
        }
    }

    fn translatable(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translatable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDraft {
    pub category: Field,
    pub name: Field,
    pub summary: Field,
    pub when_applicable: Field,
}

/// Pivot-language answer before translation.
///
/// The lead names the law and stays fixed; the body carries the narrative
/// and is translated as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerDraft {
    pub lead: Field,
    pub body: Field,
    pub references: Vec<ReferenceDraft>,
}

impl AnswerDraft {
    /// Compose the answer from retrieval results, nearest first.
    ///
    /// With no results the answer is empty.
    #[must_use]
    pub fn from_results(results: &[SearchResult]) -> Self {
        let (lead, body) = match results.first() {
            Some(best) => {
                let doc = &best.chunk.metadata.document;
                (
                    Field::fixed(format!(
                        "Based on {}, here's what you should know:\n\n",
                        first_present(&[doc.law_name.as_str()])
                    )),
                    Field::translatable(format!(
                        "{}\n\nWhen to apply: {}\n\nWho to contact: {}",
                        first_present(&[doc.summary.as_str(), doc.details.as_str()]),
                        first_present(&[doc.when_applicable.as_str()]),
                        first_present(&[doc.whom_to_approach.as_str()])
                    )),
                )
            }
            None => (Field::fixed(""), Field::translatable("")),
        };

        let references = results
            .iter()
            .map(|result| {
                let doc = &result.chunk.metadata.document;
                ReferenceDraft {
                    category: Field::translatable(doc.law_category.as_str()),
                    name: Field::fixed(doc.law_name.as_str()),
                    summary: Field::translatable(doc.summary.as_str()),
                    when_applicable: Field::translatable(doc.when_applicable.as_str()),
                }
            })
            .collect();

        Self {
            lead,
            body,
            references,
        }
    }

    fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        std::iter::once(&mut self.lead)
            .chain(std::iter::once(&mut self.body))
            .chain(self.references.iter_mut().flat_map(|r| {
                [
                    &mut r.category,
                    &mut r.name,
                    &mut r.summary,
                    &mut r.when_applicable,
                ]
            }))
    }

    /// Translate every translatable, non-blank field into `target`.
    ///
    /// Returns the number of provider calls made. On error the draft may be
    /// partially translated.
    pub fn translate(&mut self, translator: &dyn Translator, target: &str) -> Result<usize> {
        let mut calls = 0;
        for field in self.fields_mut() {
            if !field.translatable || field.text.trim().is_empty() {
                continue;
            }
            field.text = translator.translate(&field.text, target)?;
            calls += 1;
        }
        Ok(calls)
    }

    #[must_use]
    pub fn into_response(self) -> ChatResponse {
        ChatResponse {
            main_answer: self.lead.text + &self.body.text,
            legal_references: self
                .references
                .into_iter()
                .map(|r| LegalReference {
                    category: r.category.text,
                    name: r.name.text,
                    summary: r.summary.text,
                    when_applicable: r.when_applicable.text,
                })
                .collect(),
            helpful_links: Vec::new(),
            contact_info: Vec::new(),
        }
    }
}

/// First value that is neither blank nor the missing-value marker.
fn first_present<'a>(values: &[&'a str]) -> &'a str {
    values
        .iter()
        .copied()
        .find(|v| !v.trim().is_empty() && *v != NOT_AVAILABLE)
        .unwrap_or(NOT_AVAILABLE)
}
