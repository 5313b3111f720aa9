//! Query → matched drugs → grounded answer.

use notivet_core::matcher::{DrugMatcher, MatchReport, MatcherResult};
use notivet_core::models::DrugDigest;
use serde::Serialize;

use crate::generator::{GenerationError, TextGenerator};
use crate::prompts::{make_user_prompt, SYSTEM_PROMPT};

/// Answer plus the records it was grounded on.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    /// Generated answer; `None` when generation was unavailable
    pub answer: Option<String>,
    #[serde(skip)]
    pub generation_error: Option<GenerationError>,
    /// Citation labels, one per matched drug
    pub sources: Vec<String>,
    pub matched_drugs: Vec<DrugDigest>,
}

impl AssistantReply {
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// Runs the matcher and asks a generator for a grounded answer.
pub struct Assistant<'a> {
    matcher: DrugMatcher<'a>,
    generator: Option<Box<dyn TextGenerator + 'a>>,
}

impl<'a> Assistant<'a> {
    /// Assistant without a generator; replies carry matches only.
    pub fn new(matcher: DrugMatcher<'a>) -> Self {
        Self {
            matcher,
            generator: None,
        }
    }

    pub fn with_generator(mut self, generator: Box<dyn TextGenerator + 'a>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Answer a question.
    ///
    /// Matcher errors propagate. Generation errors do not: the reply still
    /// carries the sources and matched drugs.
    pub fn ask(&self, query: &str) -> MatcherResult<AssistantReply> {
        let query = query.trim();
        let report = self.matcher.search(query)?;
        let user = make_user_prompt(query, &report.drugs);

        let generated = match &self.generator {
            Some(generator) => generator.complete(SYSTEM_PROMPT, &user),
            None => Err(GenerationError::NotConfigured(
                "no text generator configured".into(),
            )),
        };

        let (answer, generation_error) = match generated {
            Ok(text) => (Some(text), None),
            Err(e) => {
                tracing::warn!(error = %e, "answer generation unavailable");
                (None, Some(e))
            }
        };

        Ok(into_reply(report, answer, generation_error))
    }
}

fn into_reply(
    report: MatchReport,
    answer: Option<String>,
    generation_error: Option<GenerationError>,
) -> AssistantReply {
    AssistantReply {
        answer,
        generation_error,
        sources: report.sources(),
        matched_drugs: report.drugs,
    }
}
