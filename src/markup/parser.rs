//! Markup parser: HTML-like fragments into a [`Dom`].
//!
//! The parser walks the source byte by byte between tags, slicing text runs
//! directly, and hands each tag to the logos tokenizer from
//! [`crate::markup::tokenizer`]. Every parsed tree hangs off a synthetic
//! [`DOCUMENT_TAG`] root so fragments with several top-level elements work.

use logos::Logos;
use tracing::debug;

use crate::dom::node::{NodeData, NodeId, DOCUMENT_TAG};
use crate::dom::tree::Dom;
use crate::markup::tokenizer::Token;

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &["input", "br", "img", "hr", "meta", "link"];

/// Elements whose content is raw text up to the matching closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Errors from markup parsing. Positions are byte offsets into the source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarkupError {
    #[error("unexpected token at byte {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("mismatched closing tag at byte {position}: expected </{expected}>, found </{found}>")]
    MismatchedClose {
        position: usize,
        expected: String,
        found: String,
    },
}

/// A positioned token with byte-level span information.
#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    /// Byte offset where this token starts in the source.
    byte_start: usize,
    /// Byte offset where this token ends in the source.
    byte_end: usize,
}

/// Parse a markup string into a [`Dom`] rooted at a `#document` node.
pub fn parse(input: &str) -> Result<Dom, MarkupError> {
    let mut dom = Dom::new();
    let root = dom.insert(NodeData::new(DOCUMENT_TAG));
    let mut parser = Parser {
        input,
        cursor: 0,
        dom,
        stack: vec![root],
    };
    parser.run()?;
    debug!(nodes = parser.dom.len(), "parsed markup");
    Ok(parser.dom)
}

/// Whether an element with this tag and attributes receives focus natively
/// or through `tabindex`.
pub fn is_focusable(data: &NodeData) -> bool {
    let native = match data.tag.as_str() {
        "button" | "select" | "textarea" => true,
        "a" => data.has_attr("href"),
        "input" => data.attr("type") != Some("hidden"),
        _ => false,
    };
    native
        || data
            .attr("tabindex")
            .is_some_and(|v| v.trim().parse::<i32>().is_ok())
}

/// Decode the character references the markup loader understands.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let name = &tail[1..semi];
            decode_reference(name).map(|c| (c, semi + 1))
        });
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Parser state: byte cursor plus the stack of open elements.
struct Parser<'a> {
    input: &'a str,
    cursor: usize,
    dom: Dom,
    stack: Vec<NodeId>,
}

impl Parser<'_> {
    fn run(&mut self) -> Result<(), MarkupError> {
        while self.cursor < self.input.len() {
            let rest = &self.input[self.cursor..];
            if rest.starts_with("<!--") {
                self.skip_past("-->", "end of comment '-->'")?;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_past(">", "end of declaration '>'")?;
            } else if rest.starts_with("</") {
                self.parse_close_tag()?;
            } else if rest.starts_with('<') {
                self.parse_open_tag()?;
            } else {
                self.parse_text();
            }
        }
        if self.stack.len() > 1 {
            let tag = self.current_tag();
            return Err(MarkupError::UnexpectedEof(format!("expected </{tag}>")));
        }
        Ok(())
    }

    fn parent(&self) -> NodeId {
        // The document root is never popped.
        self.stack[self.stack.len() - 1]
    }

    fn current_tag(&self) -> String {
        self.dom
            .get(self.parent())
            .map(|d| d.tag.clone())
            .unwrap_or_default()
    }

    fn skip_past(&mut self, terminator: &str, what: &str) -> Result<(), MarkupError> {
        match self.input[self.cursor..].find(terminator) {
            Some(idx) => {
                self.cursor += idx + terminator.len();
                Ok(())
            }
            None => Err(MarkupError::UnexpectedEof(format!("expected {what}"))),
        }
    }

    fn parse_text(&mut self) {
        let rest = &self.input[self.cursor..];
        let len = rest.find('<').unwrap_or(rest.len());
        let raw = &rest[..len];
        self.cursor += len;
        if raw.trim().is_empty() {
            return;
        }
        let parent = self.parent();
        self.dom.insert_child(parent, NodeData::text(decode_entities(raw)));
    }

    /// Tokenize from the cursor up to and including the tag terminator.
    fn tag_tokens(&mut self) -> Result<Vec<PToken>, MarkupError> {
        let start = self.cursor;
        let source = &self.input[start..];
        let mut tokens = Vec::new();
        for (result, span) in Token::lexer(source).spanned() {
            let byte_start = start + span.start;
            let token = result.map_err(|()| MarkupError::UnexpectedToken {
                position: byte_start,
                message: format!("cannot tokenize '{}'", &source[span.clone()]),
            })?;
            let done = matches!(token, Token::End | Token::SelfClose);
            tokens.push(PToken {
                token,
                text: source[span.clone()].to_owned(),
                byte_start,
                byte_end: start + span.end,
            });
            if done {
                self.cursor = start + span.end;
                return Ok(tokens);
            }
        }
        Err(MarkupError::UnexpectedEof("expected '>' to end tag".into()))
    }

    fn parse_close_tag(&mut self) -> Result<(), MarkupError> {
        let tokens = self.tag_tokens()?;
        let mut cur = TokenCursor::new(&tokens);
        cur.expect(&Token::CloseOpen)?;
        let name = cur.expect(&Token::Word)?;
        let found = name.text.to_ascii_lowercase();
        cur.expect(&Token::End)?;

        if VOID_ELEMENTS.contains(&found.as_str()) {
            return Ok(());
        }
        let expected = self.current_tag();
        if self.stack.len() == 1 || expected != found {
            return Err(MarkupError::MismatchedClose {
                position: name.byte_start,
                expected,
                found,
            });
        }
        self.stack.pop();
        Ok(())
    }

    fn parse_open_tag(&mut self) -> Result<(), MarkupError> {
        let tokens = self.tag_tokens()?;
        let mut cur = TokenCursor::new(&tokens);
        cur.expect(&Token::Open)?;
        let tag = cur.expect(&Token::Word)?.text.to_ascii_lowercase();
        let mut data = NodeData::new(tag.clone());

        let self_closing = loop {
            let Some(tok) = cur.advance() else {
                return Err(MarkupError::UnexpectedEof(format!("expected '>' to end <{tag}>")));
            };
            match tok.token {
                Token::End => break false,
                Token::SelfClose => break true,
                Token::Word => {
                    let name = tok.text.to_ascii_lowercase();
                    let value = if cur.peek_is(&Token::Equals) {
                        cur.advance();
                        cur.attribute_value()?
                    } else {
                        String::new()
                    };
                    data.set_attr(&name, decode_entities(&value));
                }
                _ => {
                    return Err(MarkupError::UnexpectedToken {
                        position: tok.byte_start,
                        message: format!("expected attribute name in <{tag}>, got '{}'", tok.text),
                    })
                }
            }
        };

        data.focusable = is_focusable(&data);
        data.disabled = data.has_attr("disabled");

        let parent = self.parent();
        let node = self.dom.insert_child(parent, data);
        if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
            return Ok(());
        }
        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            return self.parse_raw_text(node, &tag);
        }
        self.stack.push(node);
        Ok(())
    }

    fn parse_raw_text(&mut self, node: NodeId, tag: &str) -> Result<(), MarkupError> {
        let close = format!("</{tag}");
        let rest = &self.input[self.cursor..];
        let Some(idx) = rest.find(&close) else {
            return Err(MarkupError::UnexpectedEof(format!("expected </{tag}>")));
        };
        if !rest[..idx].is_empty() {
            self.dom.insert_child(node, NodeData::text(&rest[..idx]));
        }
        self.cursor += idx;
        self.stack.push(node);
        self.parse_close_tag()
    }
}

/// Cursor over the tokens of a single tag.
struct TokenCursor<'t> {
    tokens: &'t [PToken],
    index: usize,
}

impl<'t> TokenCursor<'t> {
    fn new(tokens: &'t [PToken]) -> Self {
        Self { tokens, index: 0 }
    }

    fn peek(&self) -> Option<&'t PToken> {
        self.tokens.get(self.index)
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek().is_some_and(|t| &t.token == token)
    }

    fn advance(&mut self) -> Option<&'t PToken> {
        let tok = self.tokens.get(self.index)?;
        self.index += 1;
        Some(tok)
    }

    fn expect(&mut self, expected: &Token) -> Result<&'t PToken, MarkupError> {
        match self.advance() {
            Some(tok) if &tok.token == expected => Ok(tok),
            Some(tok) => Err(MarkupError::UnexpectedToken {
                position: tok.byte_start,
                message: format!("expected {:?}, got {:?} '{}'", expected, tok.token, tok.text),
            }),
            None => Err(MarkupError::UnexpectedEof(format!("expected {:?}", expected))),
        }
    }

    /// Returns `true` if the current token starts exactly where the previous
    /// one ended.
    fn is_adjacent(&self) -> bool {
        if self.index == 0 {
            return false;
        }
        let prev = &self.tokens[self.index - 1];
        self.peek().is_some_and(|curr| curr.byte_start == prev.byte_end)
    }

    /// Quoted value, or an unquoted run of adjacent words and slashes.
    fn attribute_value(&mut self) -> Result<String, MarkupError> {
        let Some(tok) = self.advance() else {
            return Err(MarkupError::UnexpectedEof("expected attribute value".into()));
        };
        match tok.token {
            Token::DoubleQuoted | Token::SingleQuoted => Ok(tok.text[1..tok.text.len() - 1].to_owned()),
            Token::Word | Token::Slash => {
                let mut value = tok.text.clone();
                while self.is_adjacent() && (self.peek_is(&Token::Word) || self.peek_is(&Token::Slash)) {
                    if let Some(next) = self.advance() {
                        value.push_str(&next.text);
                    }
                }
                Ok(value)
            }
            _ => Err(MarkupError::UnexpectedToken {
                position: tok.byte_start,
                message: format!("expected attribute value, got '{}'", tok.text),
            }),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
