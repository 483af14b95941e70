// WHY: Inter-sentence whitespace policy keyed on the target language tag
// Kept apart from the index bookkeeping so the policy can be tested on plain strings

/// Language tag prefixes whose scripts do not put spaces between sentences
pub const SPACE_OMITTING_PREFIXES: &[&str] = &["ja", "ko", "zh"];

/// True when the tag names a script that omits whitespace between sentences.
/// An absent or empty tag makes no script assumption.
pub fn omits_space_between_sentences(target_language: Option<&str>) -> bool {
    match target_language {
        Some(tag) if !tag.is_empty() => SPACE_OMITTING_PREFIXES
            .iter()
            .any(|prefix| tag.starts_with(prefix)),
        _ => false,
    }
}

/// True when a tag is set and its script separates sentences with a space
pub fn ensures_space_between_sentences(target_language: Option<&str>) -> bool {
    match target_language {
        Some(tag) if !tag.is_empty() => !omits_space_between_sentences(target_language),
        _ => false,
    }
}

/// Iterate over the `<...>` substrings of a gap, brackets included.
///
/// Anything outside a tag is skipped. A `<` with no closing `>` ends the
/// iteration.
pub fn html_tags(gap: &str) -> HtmlTags<'_> {
    HtmlTags { gap, pos: 0 }
}

/// Iterator returned by [`html_tags`]
#[derive(Debug, Clone)]
pub struct HtmlTags<'a> {
    gap: &'a str,
    pos: usize,
}

impl<'a> Iterator for HtmlTags<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.gap.get(self.pos..)?;
        let open = self.pos + rest.find('<')?;
        let close = match self.gap[open + 1..].find('>') {
            Some(offset) => open + 1 + offset,
            None => {
                self.pos = self.gap.len();
                return None;
            }
        };
        self.pos = close + 1;
        Some(&self.gap[open..=close])
    }
}
