/// Trim and collapse every run of whitespace (newlines included) into one ASCII space.
///
/// Feed text wraps abstracts at arbitrary columns; chunking and display both want the
/// flowed form.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::collapse_whitespace;

    #[test]
    fn collapses_newlines_and_tabs() {
        assert_eq!(
            collapse_whitespace("  Large language\n  models\tconsume  power \r\n"),
            "Large language models consume power"
        );
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(collapse_whitespace(" \n\t "), "");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn keeps_unicode_words_intact() {
        assert_eq!(collapse_whitespace("naïve\u{00a0}Bayes  über"), "naïve Bayes über");
    }
}
