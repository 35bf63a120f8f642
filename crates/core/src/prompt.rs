use crate::config::ContextLength;
use crate::response::FOLLOW_UP_MARKER;

pub const DOMAIN_DIRECTIVE: &str = "Answer like an airport domain expert. When asked about \
the fourth control period, only give information about the fourth control period and nothing \
else; when asked about the third control period, only give information about the third control \
period. When asked about traffic, include both international and domestic figures and all of \
their sub-bifurcations.";

#[derive(Debug, Clone)]
pub struct Prompt {
    pub context: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub directive: String,
    pub request_follow_ups: bool,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            directive: DOMAIN_DIRECTIVE.to_string(),
            request_follow_ups: true,
        }
    }
}

impl PromptTemplate {
    pub fn build<S: AsRef<str>>(
        &self,
        question: &str,
        retrieved: &[S],
        max_context: ContextLength,
    ) -> Prompt {
        let context = build_context(retrieved, max_context.get());

        let mut text = format!(
            "Context:\n{context}\n\nQuestion: {question}\n\n{}",
            self.directive
        );
        if self.request_follow_ups {
            text.push_str(&format!(
                "\n\nAfter the answer, write a line reading \"{FOLLOW_UP_MARKER}\" followed by \
                 up to three related questions, one per line."
            ));
        }

        Prompt { context, text }
    }
}

/// Joins chunk texts with single spaces and hard-cuts the result to
/// `max_chars` characters.
pub fn build_context<S: AsRef<str>>(retrieved: &[S], max_chars: usize) -> String {
    let joined = retrieved
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");

    match joined.char_indices().nth(max_chars) {
        Some((cut, _)) => joined[..cut].to_string(),
        None => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(value: usize) -> ContextLength {
        ContextLength::new(value).expect("in range")
    }

    #[test]
    fn context_joins_chunks_with_single_spaces() {
        assert_eq!(build_context(&["alpha", "beta", "gamma"], 1_000), "alpha beta gamma");
    }

    #[test]
    fn long_context_is_cut_to_exact_length() {
        let chunks = vec!["r".repeat(1_500), "e".repeat(1_500)];
        let prompt = PromptTemplate::default().build("Revenue?", &chunks, length(1_000));
        assert_eq!(prompt.context.chars().count(), 1_000);
        assert!(prompt.text.starts_with(&format!("Context:\n{}\n\n", prompt.context)));
    }

    #[test]
    fn short_context_is_unchanged() {
        let chunks = ["Revenue was 10", "Expenses were 4"];
        let prompt = PromptTemplate::default().build("Margin?", &chunks, length(3_000));
        assert_eq!(prompt.context, "Revenue was 10 Expenses were 4");
    }

    #[test]
    fn context_of_exact_length_is_unchanged() {
        let chunk = "x".repeat(1_000);
        assert_eq!(build_context(&[chunk.as_str()], 1_000), chunk);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let chunk = "€".repeat(1_200);
        let context = build_context(&[chunk], 1_000);
        assert_eq!(context.chars().count(), 1_000);
    }

    #[test]
    fn prompt_carries_question_and_directive() {
        let prompt = PromptTemplate::default().build(
            "What was domestic traffic in the fourth control period?",
            &["Traffic table"],
            length(3_000),
        );

        assert!(prompt
            .text
            .contains("Question: What was domestic traffic in the fourth control period?"));
        assert!(prompt.text.contains("international and domestic"));
        assert!(prompt.text.contains(FOLLOW_UP_MARKER));
    }

    #[test]
    fn follow_up_request_can_be_disabled() {
        let template = PromptTemplate {
            request_follow_ups: false,
            ..PromptTemplate::default()
        };
        let prompt = template.build("Q?", &["ctx"], length(1_000));
        assert!(!prompt.text.contains(FOLLOW_UP_MARKER));
        assert!(prompt.text.ends_with(DOMAIN_DIRECTIVE));
    }
}
