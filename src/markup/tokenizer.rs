//! logos-based tag tokenizer.
//!
//! Only the inside of a tag is tokenized; text between tags is sliced from
//! the source by the parser. Token priority in logos is determined by:
//! 1. Longest match wins (`</` beats `<`, `/>` beats `/`)
//! 2. For equal length matches, earlier-defined variants win

use logos::Logos;

/// Tag-level token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Delimiters (longer matches, defined first) ───────────────────

    /// `</`, start of a closing tag.
    #[token("</")]
    CloseOpen,

    /// `/>`, end of a self-closing tag.
    #[token("/>")]
    SelfClose,

    /// `<`
    #[token("<")]
    Open,

    /// `>`
    #[token(">")]
    End,

    /// `=`
    #[token("=")]
    Equals,

    /// `/` outside `/>`, only meaningful inside unquoted attribute values.
    #[token("/")]
    Slash,

    // ── Values ───────────────────────────────────────────────────────

    /// Double-quoted attribute value.
    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    /// Single-quoted attribute value.
    #[regex(r"'[^']*'")]
    SingleQuoted,

    /// Tag name, attribute name or unquoted attribute value.
    #[regex(r#"[^\s<>="'/]+"#)]
    Word,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<(Token, String)> {
        Token::lexer(input)
            .spanned()
            .map(|(result, span)| (result.expect("lexes"), input[span].to_string()))
            .collect()
    }

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input).into_iter().map(|(t, _)| t).collect()
    }

    // ── Delimiters ───────────────────────────────────────────────────

    #[test]
    fn open_tag_with_attributes() {
        assert_eq!(
            tokens(r#"<button data-dialog-trigger="enroll" disabled>"#),
            vec![
                Token::Open,
                Token::Word,
                Token::Word,
                Token::Equals,
                Token::DoubleQuoted,
                Token::Word,
                Token::End,
            ]
        );
    }

    #[test]
    fn close_and_self_close_beat_single_chars() {
        assert_eq!(tokens("</div>"), vec![Token::CloseOpen, Token::Word, Token::End]);
        assert_eq!(tokens("<br/>"), vec![Token::Open, Token::Word, Token::SelfClose]);
    }

    // ── Values ───────────────────────────────────────────────────────

    #[test]
    fn quoted_values_keep_quotes() {
        let result = tokenize(r#"a="x y" b='z'"#);
        assert_eq!(result[2], (Token::DoubleQuoted, r#""x y""#.into()));
        assert_eq!(result[5], (Token::SingleQuoted, "'z'".into()));
    }

    #[test]
    fn unquoted_path_splits_on_slash() {
        assert_eq!(
            tokens("data-href=/courses/new"),
            vec![
                Token::Word,
                Token::Equals,
                Token::Slash,
                Token::Word,
                Token::Slash,
                Token::Word,
            ]
        );
    }

    #[test]
    fn hyphenated_names_are_single_words() {
        let result = tokenize("data-close-on-overlay");
        assert_eq!(result, vec![(Token::Word, "data-close-on-overlay".into())]);
    }
}
