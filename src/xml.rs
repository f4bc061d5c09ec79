//! XML token-stream dump, used as a `--dump-tokens` diagnostic aid.
//!
//! One element per token, named after its [`TokenKind`], wrapped in a
//! single `<tokens>` root — the same shape the original project's token
//! writer produced, kept here as an optional side artifact rather than
//! the compiler's primary output.

use crate::token::Token;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            other => out.push(other),
        }
    }
    out
}

/// Renders a token stream as `<tokens>...</tokens>` XML text.
pub fn write_tokens(tokens: &[Token]) -> String {
    let mut out = String::from("<tokens>\n");
    for tok in tokens {
        let tag = tok.kind.to_string();
        out.push_str(&format!("<{tag}> {} </{tag}>\n", escape(&tok.lexeme)));
    }
    out.push_str("</tokens>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{TokenKind, TokenSubkind};

    #[test]
    fn wraps_tokens_in_a_tokens_root() {
        let tokens = vec![Token::keyword("class", 1, TokenSubkind::Class)];
        let xml = write_tokens(&tokens);
        assert!(xml.starts_with("<tokens>\n"));
        assert!(xml.ends_with("</tokens>\n"));
        assert!(xml.contains("<keyword> class </keyword>"));
    }

    #[test]
    fn escapes_reserved_xml_characters() {
        let tokens = vec![Token::new("<a & \"b\">", 1, TokenKind::StringConstant, TokenSubkind::None)];
        let xml = write_tokens(&tokens);
        assert!(xml.contains("&lt;a &amp; &quot;b&quot;&gt;"));
    }
}
