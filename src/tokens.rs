//! Token counting for LLM context budget management.
//!
//! Uses tiktoken-rs for accurate OpenAI-compatible token counts,
//! with a fallback heuristic when tiktoken is unavailable.

use std::sync::OnceLock;

use tiktoken_rs::tokenizer::{get_tokenizer, Tokenizer};
use tiktoken_rs::CoreBPE;
use tracing::debug;

/// Model profile used when none is given.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Token encoding to use for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// cl100k_base: GPT-4, GPT-3.5-turbo, ChatGPT
    #[default]
    Cl100kBase,
    /// o200k_base: GPT-4o
    O200kBase,
    /// p50k_base: Codex, text-davinci-002/003
    P50kBase,
    /// p50k_edit: edit models
    P50kEdit,
    /// r50k_base: GPT-3, GPT-2
    R50kBase,
}

impl Encoding {
    /// Resolve the encoding for a model name.
    ///
    /// Unknown models fall back to the default encoding (cl100k_base).
    ///
    /// # Examples
    ///
    /// ```
    /// use sift::tokens::Encoding;
    ///
    /// assert_eq!(Encoding::for_model("gpt-4o"), Encoding::O200kBase);
    /// assert_eq!(Encoding::for_model("no-such-model"), Encoding::Cl100kBase);
    /// ```
    pub fn for_model(model: &str) -> Self {
        let encoding = match get_tokenizer(model) {
            Some(Tokenizer::O200kBase) => Some(Encoding::O200kBase),
            Some(Tokenizer::Cl100kBase) => Some(Encoding::Cl100kBase),
            Some(Tokenizer::P50kBase) => Some(Encoding::P50kBase),
            Some(Tokenizer::P50kEdit) => Some(Encoding::P50kEdit),
            Some(Tokenizer::R50kBase) | Some(Tokenizer::Gpt2) => Some(Encoding::R50kBase),
            #[allow(unreachable_patterns)]
            _ => None,
        };

        encoding.unwrap_or_else(|| {
            debug!(model, "unknown model, using default encoding");
            Encoding::default()
        })
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Cl100kBase => write!(f, "cl100k_base"),
            Encoding::O200kBase => write!(f, "o200k_base"),
            Encoding::P50kBase => write!(f, "p50k_base"),
            Encoding::P50kEdit => write!(f, "p50k_edit"),
            Encoding::R50kBase => write!(f, "r50k_base"),
        }
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" => Ok(Encoding::Cl100kBase),
            "o200k" | "o200k_base" => Ok(Encoding::O200kBase),
            "p50k" | "p50k_base" => Ok(Encoding::P50kBase),
            "p50k_edit" => Ok(Encoding::P50kEdit),
            "r50k" | "r50k_base" | "gpt2" => Ok(Encoding::R50kBase),
            _ => Err(format!("unknown encoding: {}", s)),
        }
    }
}

// Cached tokenizers - initialized once per encoding
static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();
static O200K: OnceLock<Option<CoreBPE>> = OnceLock::new();
static P50K: OnceLock<Option<CoreBPE>> = OnceLock::new();
static P50K_EDIT: OnceLock<Option<CoreBPE>> = OnceLock::new();
static R50K: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn get_bpe(encoding: Encoding) -> Option<&'static CoreBPE> {
    match encoding {
        Encoding::Cl100kBase => CL100K
            .get_or_init(|| tiktoken_rs::cl100k_base().ok())
            .as_ref(),
        Encoding::O200kBase => O200K
            .get_or_init(|| tiktoken_rs::o200k_base().ok())
            .as_ref(),
        Encoding::P50kBase => P50K
            .get_or_init(|| tiktoken_rs::p50k_base().ok())
            .as_ref(),
        Encoding::P50kEdit => P50K_EDIT
            .get_or_init(|| tiktoken_rs::p50k_edit().ok())
            .as_ref(),
        Encoding::R50kBase => R50K
            .get_or_init(|| tiktoken_rs::r50k_base().ok())
            .as_ref(),
    }
}

/// Count tokens using tiktoken.
fn tiktoken_count(text: &str, encoding: Encoding) -> Option<usize> {
    let bpe = get_bpe(encoding)?;
    Some(bpe.encode_ordinary(text).len())
}

/// Fallback heuristic: ~4 characters per token.
fn fallback_count(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Count tokens in text using the default encoding (cl100k_base).
///
/// This function never fails - it falls back to a heuristic if
/// tiktoken is unavailable.
///
/// # Examples
///
/// ```
/// use sift::tokens::count_tokens;
///
/// let count = count_tokens("Hello, world!");
/// assert!(count > 0);
/// ```
pub fn count_tokens(text: &str) -> usize {
    count_tokens_with_encoding(text, Encoding::default())
}

/// Count tokens in text using the specified encoding.
pub fn count_tokens_with_encoding(text: &str, encoding: Encoding) -> usize {
    tiktoken_count(text, encoding).unwrap_or_else(|| fallback_count(text))
}

/// Count tokens in text for a named model profile.
///
/// # Examples
///
/// ```
/// use sift::tokens::count_tokens_for_model;
///
/// let count = count_tokens_for_model("Hello, world!", "gpt-3.5-turbo");
/// assert!(count > 0);
/// ```
pub fn count_tokens_for_model(text: &str, model: &str) -> usize {
    count_tokens_with_encoding(text, Encoding::for_model(model))
}

/// Reusable token counter bound to one encoding.
pub struct TokenCounter {
    encoding: Encoding,
}

impl TokenCounter {
    /// Create a new token counter with the specified encoding.
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    /// Create a counter for a model profile.
    pub fn for_model(model: &str) -> Self {
        Self::new(Encoding::for_model(model))
    }

    /// Count tokens in the given text.
    pub fn count(&self, text: &str) -> usize {
        count_tokens_with_encoding(text, self.encoding)
    }

    /// Get the encoding this counter uses.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::for_model(DEFAULT_MODEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string() {
        assert_eq!(count_tokens(""), 0);
    }

    #[test]
    fn test_simple_text() {
        let count = count_tokens("Hello, world!");
        assert!(count > 0 && count < 10);
    }

    #[test]
    fn test_longer_text_never_counts_less() {
        let short = "public class Main {}\n";
        let long = short.repeat(20);
        assert!(count_tokens_for_model(&long, DEFAULT_MODEL) >= count_tokens_for_model(short, DEFAULT_MODEL));
    }

    #[test]
    fn test_fallback_approximation() {
        assert_eq!(fallback_count(""), 0);
        assert_eq!(fallback_count("a"), 1);
        assert_eq!(fallback_count("abcd"), 1);
        assert_eq!(fallback_count("abcde"), 2);
        assert_eq!(fallback_count("abcdefgh"), 2);
    }

    #[test]
    fn test_encoding_for_model() {
        assert_eq!(Encoding::for_model("gpt-3.5-turbo"), Encoding::Cl100kBase);
        assert_eq!(Encoding::for_model("gpt-4"), Encoding::Cl100kBase);
        assert_eq!(Encoding::for_model("gpt-4o"), Encoding::O200kBase);
        assert_eq!(Encoding::for_model("text-davinci-003"), Encoding::P50kBase);
    }

    #[test]
    fn test_unknown_model_falls_back() {
        assert_eq!(Encoding::for_model("llama-unknown"), Encoding::Cl100kBase);
        assert_eq!(
            count_tokens_for_model("some text", "llama-unknown"),
            count_tokens("some text")
        );
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("cl100k".parse::<Encoding>().unwrap(), Encoding::Cl100kBase);
        assert_eq!(
            "cl100k_base".parse::<Encoding>().unwrap(),
            Encoding::Cl100kBase
        );
        assert_eq!("o200k".parse::<Encoding>().unwrap(), Encoding::O200kBase);
        assert_eq!("p50k_edit".parse::<Encoding>().unwrap(), Encoding::P50kEdit);
        assert!("invalid".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_token_counter() {
        let counter = TokenCounter::for_model("gpt-4o");
        assert_eq!(counter.encoding(), Encoding::O200kBase);
        assert!(counter.count("Test text") > 0);
        assert_eq!(TokenCounter::default().encoding(), Encoding::Cl100kBase);
    }
}
