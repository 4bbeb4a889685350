//! Text-format transformers and the outermost-match search over them.
//!
//! The regex engine has no look-around, so the full `open + content + close` match is computed
//! by a small hand-written matcher per tag. A single alternation regex over every tag is still
//! used to find opener candidates.
//!
//! Two matching modes exist. With escapes honored (the default), an opener or closer preceded
//! by an odd number of backslashes is literal text and a tag may not be glued to another
//! unescaped copy of its own character. The permissive mode drops the escape rules and only
//! requires the content to start and end with something other than the tag or whitespace.
//!
//! Code spans bind tighter than the other tags: while looking for a closer, a complete code
//! span inside the content is stepped over as a whole.

use crate::tree::TextFormat;
use regex::Regex;

/// One paired tag and the flags it sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFormatTransformer {
    name: &'static str,
    pub tag: &'static str,
    pub format: TextFormat,
    /// Whether the tag may open or close in the middle of a word.
    pub intraword: bool,
}

impl TextFormatTransformer {
    pub const fn new(
        name: &'static str,
        tag: &'static str,
        format: TextFormat,
        intraword: bool,
    ) -> Self {
        TextFormatTransformer {
            name,
            tag,
            format,
            intraword,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }
}

const BOLD_ITALIC: TextFormat = TextFormat::BOLD.union(TextFormat::ITALIC);

/// The standard tag table. Longer tags come before their prefixes.
pub fn defaults() -> Vec<TextFormatTransformer> {
    vec![
        TextFormatTransformer::new("bold-italic-star", "***", BOLD_ITALIC, true),
        TextFormatTransformer::new("bold-italic-underscore", "___", BOLD_ITALIC, false),
        TextFormatTransformer::new("bold-star", "**", TextFormat::BOLD, true),
        TextFormatTransformer::new("bold-underscore", "__", TextFormat::BOLD, false),
        TextFormatTransformer::new("italic-star", "*", TextFormat::ITALIC, false),
        TextFormatTransformer::new("italic-underscore", "_", TextFormat::ITALIC, false),
        TextFormatTransformer::new("strikethrough", "~~", TextFormat::STRIKETHROUGH, true),
        TextFormatTransformer::new("inline-code", "`", TextFormat::CODE, true),
    ]
}

/// ASCII punctuation or whitespace: what a non-intraword tag must touch on both sides.
pub fn is_punctuation_or_space(c: char) -> bool {
    c.is_ascii_punctuation() || c.is_whitespace()
}

/// True when the byte at `index` is preceded by an odd number of backslashes.
pub fn is_escaped(text: &str, index: usize) -> bool {
    text.as_bytes()[..index]
        .iter()
        .rev()
        .take_while(|b| **b == b'\\')
        .count()
        % 2
        == 1
}

/// A non-intraword span must touch punctuation, whitespace or the edge on both sides.
fn is_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.map_or(true, is_punctuation_or_space) && after.map_or(true, is_punctuation_or_space)
}

/// A resolved tag span inside a text run (byte offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineMatch {
    /// Index into the table's transformers.
    pub transformer: usize,
    pub start: usize,
    pub end: usize,
    pub content_start: usize,
    pub content_end: usize,
}

const CODE_TAG: &str = "`";

#[derive(Debug, Clone)]
struct TagMatcher {
    tag: &'static str,
    honor_escapes: bool,
}

impl TagMatcher {
    fn is_tag_char(&self, c: char) -> bool {
        self.tag.contains(c)
    }

    fn is_tag_char_or_space(&self, c: char) -> bool {
        self.is_tag_char(c) || c.is_whitespace()
    }

    /// Match `tag content tag` opening exactly at `start`; returns the end of the content.
    fn match_at(&self, text: &str, start: usize) -> Option<usize> {
        if !text[start..].starts_with(self.tag) {
            return None;
        }
        if self.honor_escapes && (is_escaped(text, start) || self.glued_before(text, start)) {
            return None;
        }
        let content_start = start + self.tag.len();
        if !self.honor_escapes {
            let first = text[content_start..].chars().next()?;
            if self.is_tag_char_or_space(first) {
                return None;
            }
        }

        let mut content_end = content_start;
        loop {
            let c = text[content_end..].chars().next()?;
            if c == '\n' {
                return None;
            }
            content_end = self
                .code_span_end(text, content_end)
                .unwrap_or(content_end + c.len_utf8());
            if self.accepts(text, content_start, content_end) {
                return Some(content_end);
            }
        }
    }

    /// An unescaped copy of the tag's character right before `start`.
    fn glued_before(&self, text: &str, start: usize) -> bool {
        text[..start]
            .char_indices()
            .next_back()
            .is_some_and(|(index, c)| self.is_tag_char(c) && !is_escaped(text, index))
    }

    /// End of a complete code span opening at `at`, when this is not the code tag itself.
    fn code_span_end(&self, text: &str, at: usize) -> Option<usize> {
        if self.tag == CODE_TAG || !text[at..].starts_with(CODE_TAG) {
            return None;
        }
        if self.honor_escapes && is_escaped(text, at) {
            return None;
        }
        let code = TagMatcher {
            tag: CODE_TAG,
            honor_escapes: self.honor_escapes,
        };
        code.match_at(text, at).map(|content_end| content_end + CODE_TAG.len())
    }

    fn accepts(&self, text: &str, content_start: usize, content_end: usize) -> bool {
        let content = &text[content_start..content_end];
        if content.contains('\n') || !text[content_end..].starts_with(self.tag) {
            return false;
        }
        let after = text[content_end + self.tag.len()..].chars().next();
        if !self.honor_escapes {
            let last_ok = content
                .chars()
                .next_back()
                .is_some_and(|c| !self.is_tag_char_or_space(c));
            let glued = text[content_end + self.tag.len()..].starts_with(self.tag);
            return last_ok && !glued;
        }

        // An escaped punctuation character is literal, whatever it is.
        let last_ok = content.char_indices().next_back().is_some_and(|(index, c)| {
            (c.is_ascii_punctuation() && is_escaped(content, index))
                || !self.is_tag_char_or_space(c)
        });
        let closer_escaped = is_escaped(text, content_end);
        let after_ok = after.map_or(true, |c| !self.is_tag_char(c));
        last_ok && !closer_escaped && after_ok
    }
}

/// The text-format transformers plus their compiled matchers.
pub struct TextFormatTable {
    transformers: Vec<TextFormatTransformer>,
    matchers: Vec<TagMatcher>,
    openers: Option<Regex>,
    honor_escapes: bool,
}

impl TextFormatTable {
    pub fn new(transformers: Vec<TextFormatTransformer>, honor_escapes: bool) -> Self {
        let matchers = transformers
            .iter()
            .map(|t| TagMatcher {
                tag: t.tag,
                honor_escapes,
            })
            .collect();
        let openers = if transformers.is_empty() {
            None
        } else {
            let alternation = transformers
                .iter()
                .map(|t| regex::escape(t.tag))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation).expect("escaped tag alternation is a valid regex"))
        };
        TextFormatTable {
            transformers,
            matchers,
            openers,
            honor_escapes,
        }
    }

    pub fn transformers(&self) -> &[TextFormatTransformer] {
        &self.transformers
    }

    pub fn get(&self, index: usize) -> Option<&TextFormatTransformer> {
        self.transformers.get(index)
    }

    pub fn honors_escapes(&self) -> bool {
        self.honor_escapes
    }

    /// Find the leftmost tag span whose opener is not nested inside an earlier span.
    pub fn find_outermost(&self, text: &str) -> Option<InlineMatch> {
        let openers = self.openers.as_ref()?;
        let mut from = 0;
        while let Some(candidate) = openers.find_at(text, from) {
            let start = candidate.start();
            if !(self.honor_escapes && is_escaped(text, start)) {
                if let Some(found) = self.match_at(text, start) {
                    return Some(found);
                }
            }
            from = start + text[start..].chars().next().map_or(1, char::len_utf8);
            if from > text.len() {
                break;
            }
        }
        None
    }

    /// Find a span that closes exactly at the end of `text`, trying the opener nearest to the
    /// end first. This is the check run after a closing tag has been typed, so the content may
    /// not start with a tag character or whitespace either.
    pub fn find_closing(&self, text: &str) -> Option<InlineMatch> {
        let openers = self.openers.as_ref()?;
        let mut starts = Vec::new();
        let mut from = 0;
        while let Some(candidate) = openers.find_at(text, from) {
            starts.push(candidate.start());
            from = candidate.start()
                + text[candidate.start()..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
            if from > text.len() {
                break;
            }
        }

        for start in starts.into_iter().rev() {
            if self.honor_escapes && is_escaped(text, start) {
                continue;
            }
            for (index, (transformer, matcher)) in
                self.transformers.iter().zip(&self.matchers).enumerate()
            {
                let Some(content_end) = matcher.match_at(text, start) else {
                    continue;
                };
                let content_start = start + transformer.tag.len();
                let end = content_end + transformer.tag.len();
                let opens_cleanly = text[content_start..]
                    .chars()
                    .next()
                    .is_some_and(|c| !matcher.is_tag_char_or_space(c));
                if end != text.len() || !opens_cleanly {
                    continue;
                }
                if !transformer.intraword && !is_bounded(text, start, end) {
                    continue;
                }
                return Some(InlineMatch {
                    transformer: index,
                    start,
                    end,
                    content_start,
                    content_end,
                });
            }
        }
        None
    }

    fn match_at(&self, text: &str, start: usize) -> Option<InlineMatch> {
        for (index, (transformer, matcher)) in
            self.transformers.iter().zip(&self.matchers).enumerate()
        {
            let Some(content_end) = matcher.match_at(text, start) else {
                continue;
            };
            let end = content_end + transformer.tag.len();
            if !transformer.intraword && !is_bounded(text, start, end) {
                continue;
            }
            return Some(InlineMatch {
                transformer: index,
                start,
                end,
                content_start: start + transformer.tag.len(),
                content_end,
            });
        }
        None
    }
}
