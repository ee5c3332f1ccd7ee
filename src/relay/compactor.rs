//! Transcript-to-prompt compaction.
//!
//! Turns an unbounded conversation into a prompt that fits a fixed token
//! budget: the transcript is flattened one line per turn, right-truncated
//! to the head-room left by the template (oldest tokens dropped first),
//! and substituted into the template's `{{input}}` placeholder.

use std::sync::Arc;

use tracing::debug;

use crate::relay::errors::{RelayError, RelayResult};
use crate::relay::history::Turn;
use crate::relay::tokenizer::Tokenizer;

/// Variable name substituted with the compacted transcript.
pub const INPUT_VARIABLE: &str = "input";

/// Builds token-bounded prompts from transcripts and templates.
pub struct PromptCompactor {
    tokenizer: Arc<Tokenizer>,
    max_prompt_tokens: usize,
}

impl PromptCompactor {
    /// Create a compactor with a total prompt token budget.
    #[must_use]
    pub fn new(tokenizer: Arc<Tokenizer>, max_prompt_tokens: usize) -> Self {
        Self {
            tokenizer,
            max_prompt_tokens,
        }
    }

    /// Flatten turns into one `<speaker>: <text>` line per turn, oldest
    /// first.
    #[must_use]
    pub fn flatten_turns(turns: &[Turn]) -> String {
        turns
            .iter()
            .map(|turn| format!("{}: {}", turn.speaker, turn.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Keep the trailing `max_tokens` tokens of `text`.
    ///
    /// A no-op when the text already fits. Otherwise tokens are dropped
    /// from the beginning of the encoded sequence and the tail is decoded;
    /// the cut may land mid-word, which is accepted.
    #[must_use]
    pub fn truncate_to_recent(&self, text: &str, max_tokens: usize) -> String {
        if max_tokens == 0 {
            return String::new();
        }
        let tokens = self.tokenizer.encode(text);
        if tokens.len() <= max_tokens {
            return text.to_string();
        }
        let tail = &tokens[tokens.len() - max_tokens..];
        debug!(
            dropped = tokens.len() - max_tokens,
            kept = tail.len(),
            "truncating transcript to most recent tokens"
        );
        self.tokenizer.decode_suffix_lossy(tail)
    }

    /// Render the final prompt for a transcript.
    ///
    /// The template is budgeted with the placeholder still unresolved; the
    /// transcript gets whatever head-room remains, which may be zero. An
    /// empty transcript section is valid output, not an error.
    ///
    /// # Errors
    /// Returns `InvalidTemplate` if `template` contains no `{{input}}`
    /// placeholder.
    pub fn render(&self, template: &str, turns: &[Turn]) -> RelayResult<String> {
        let placeholder = placeholder_token(INPUT_VARIABLE);
        if !template.contains(&placeholder) {
            return Err(RelayError::InvalidTemplate);
        }

        let template_tokens = self.tokenizer.count(template);
        let remaining = self.max_prompt_tokens.saturating_sub(template_tokens);
        let transcript = Self::flatten_turns(turns);
        let compacted = self.truncate_to_recent(&transcript, remaining);

        Ok(inject_variables(
            template,
            &[(INPUT_VARIABLE, compacted.as_str())],
        ))
    }
}

fn placeholder_token(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Replace every occurrence of each whitelisted `{{name}}` placeholder.
///
/// Only the listed variables are substituted; any other placeholder-like
/// text, including user-supplied braces, passes through untouched.
#[must_use]
pub fn inject_variables(template: &str, values: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (name, value) in values {
        result = result.replace(&placeholder_token(name), value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compactor(max_prompt_tokens: usize) -> PromptCompactor {
        PromptCompactor::new(Arc::new(Tokenizer::new().unwrap()), max_prompt_tokens)
    }

    fn turn(speaker: &str, text: &str) -> Turn {
        Turn::new(speaker, text)
    }

    #[test]
    fn test_flatten_joins_turns_with_newlines() {
        let turns = vec![turn("User", "Hi"), turn("Assistant", "Hello!")];
        assert_eq!(
            PromptCompactor::flatten_turns(&turns),
            "User: Hi\nAssistant: Hello!"
        );
    }

    #[test]
    fn test_transcript_that_fits_is_untouched() {
        let compactor = compactor(4000);
        let turns = vec![turn("User", "Hi")];
        let prompt = compactor.render("{{input}}", &turns).unwrap();
        assert_eq!(prompt, "User: Hi");
    }

    #[test]
    fn test_truncation_keeps_a_text_suffix() {
        let compactor = compactor(40);
        let turns: Vec<Turn> = (0..50)
            .map(|_| turn("User", "the quick brown fox jumps over the lazy dog"))
            .collect();
        let transcript = PromptCompactor::flatten_turns(&turns);
        let prompt = compactor.render("{{input}}", &turns).unwrap();

        assert!(transcript.ends_with(&prompt));
        assert!(prompt.len() < transcript.len());
    }

    #[test]
    fn test_budget_respected_across_budgets() {
        let tokenizer = Arc::new(Tokenizer::new().unwrap());
        let turns: Vec<Turn> = (0..30)
            .map(|_| turn("User", "a reasonably ordinary sentence about nothing much"))
            .collect();
        for budget in [1usize, 5, 16, 64, 200] {
            let compactor = PromptCompactor::new(Arc::clone(&tokenizer), budget);
            let prompt = compactor.render("{{input}}", &turns).unwrap();
            assert!(
                tokenizer.count(&prompt) <= budget,
                "budget {budget} exceeded"
            );
        }
    }

    #[test]
    fn test_zero_headroom_emits_empty_transcript() {
        // The template alone consumes the whole budget.
        let compactor = compactor(1);
        let turns = vec![turn("User", "Hi")];
        let prompt = compactor.render("Transcript: {{input}}", &turns).unwrap();
        assert_eq!(prompt, "Transcript: ");
    }

    #[test]
    fn test_template_without_placeholder_fails() {
        let compactor = compactor(4000);
        let result = compactor.render("no placeholder here", &[]);
        assert!(matches!(result, Err(RelayError::InvalidTemplate)));
    }

    #[test]
    fn test_substitution_is_exact() {
        assert_eq!(
            inject_variables("Hello {{input}} world", &[("input", "X")]),
            "Hello X world"
        );
    }

    #[test]
    fn test_substitution_replaces_all_occurrences() {
        assert_eq!(
            inject_variables("{{input}} and {{input}}", &[("input", "X")]),
            "X and X"
        );
    }

    #[test]
    fn test_substitution_ignores_unlisted_placeholders() {
        assert_eq!(
            inject_variables("{{input}} {{other}}", &[("input", "X")]),
            "X {{other}}"
        );
    }
}
