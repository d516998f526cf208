//! Lowercasing alphanumeric tokenizer.
//!
//! Tokenizes text by lowercasing it and extracting maximal runs of ASCII
//! letters and digits (`[a-z0-9]+`). Everything else, including non-ASCII
//! letters, acts as a separator. No stop words and no stemming. Uses a
//! zero-per-token allocation design via byte spans.

/// Tokenized text: owns the lowercased buffer, provides &str slices via byte spans.
/// Only 1 heap allocation (the lowercased String) instead of N per-token Strings.
#[derive(Debug, Clone, Default)]
pub struct Tokens {
    buffer: String,
    spans: Vec<(u32, u32)>, // (start, end) byte offsets into buffer
}

impl Tokens {
    /// Returns an iterator over the token `&str` slices, in input order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans
            .iter()
            .map(|&(s, e)| &self.buffer[s as usize..e as usize])
    }

    /// Returns the number of tokens, counting repeats.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Copies the tokens out into owned strings.
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_owned).collect()
    }
}

#[inline]
const fn is_term_byte(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit()
}

/// Tokenize text: lowercase, then keep maximal `[a-z0-9]` runs.
///
/// Lowercasing is Unicode-aware so characters such as the Kelvin sign fold
/// into ASCII before extraction. Scanning is bytewise: ASCII bytes never occur
/// inside a multi-byte UTF-8 sequence, so every span lands on a char boundary.
pub fn tokenize(text: &str) -> Tokens {
    let buffer = text.to_lowercase();
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &b) in buffer.as_bytes().iter().enumerate() {
        if is_term_byte(b) {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            spans.push((s as u32, i as u32));
        }
    }
    // Handle last token (no trailing separator)
    if let Some(s) = start {
        spans.push((s as u32, buffer.len() as u32));
    }

    Tokens { buffer, spans }
}
