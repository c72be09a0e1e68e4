//! Sentence segmentation for streamed text.
//!
//! A sentence ends at any single terminal punctuation mark. There is no
//! lookahead: abbreviations, decimals and quoted punctuation all close a
//! sentence, which keeps the split predictable while text is still arriving.

/// Characters that close a sentence.
pub const TERMINALS: [char; 6] = ['。', '！', '？', '.', '?', '!'];

/// Whether `ch` closes a sentence.
pub fn is_terminal(ch: char) -> bool {
    TERMINALS.contains(&ch)
}

/// Split `content` into completed sentences and the unterminated rest.
///
/// Sentences keep their punctuation and are trimmed. The remainder is the
/// untrimmed text after the last terminal (all of `content` if none).
///
/// # Example
/// ```
/// use chatsplit::sentence::split_sentences;
///
/// let (sentences, rest) = split_sentences("First. Second? Third");
/// assert_eq!(sentences, vec!["First.", "Second?"]);
/// assert_eq!(rest, " Third");
/// ```
pub fn split_sentences(content: &str) -> (Vec<String>, String) {
    let mut sentences = Vec::new();
    let mut start = 0;

    for (idx, ch) in content.char_indices() {
        if is_terminal(ch) {
            let end = idx + ch.len_utf8();
            sentences.push(content[start..end].trim().to_string());
            start = end;
        }
    }

    (sentences, content[start..].to_string())
}

/// Holds the unterminated tail between pieces of streamed text.
///
/// # Example
/// ```
/// use chatsplit::sentence::SentenceBuffer;
///
/// let mut buffer = SentenceBuffer::new();
/// assert!(buffer.push("Hello").is_empty());
/// assert_eq!(buffer.push(" world. How"), vec!["Hello world."]);
/// assert_eq!(buffer.finish().as_deref(), Some("How"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct SentenceBuffer {
    pending: String,
}

impl SentenceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `piece` and return the sentences it completes.
    pub fn push(&mut self, piece: &str) -> Vec<String> {
        self.pending.push_str(piece);
        let (sentences, rest) = split_sentences(&self.pending);
        if !sentences.is_empty() {
            self.pending = rest;
        }
        sentences
    }

    /// Text received but not yet emitted.
    pub fn remainder(&self) -> &str {
        &self.pending
    }

    /// End the session, returning the trimmed tail unless it is blank.
    pub fn finish(self) -> Option<String> {
        let tail = self.pending.trim();
        (!tail.is_empty()).then(|| tail.to_string())
    }
}
