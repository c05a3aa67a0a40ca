//! Lexer (tokenizer) for filter clauses.

use super::error::{FilterError, FilterResult};
use crate::value::Value;

/// Reserved words lexed as symbols rather than identifiers.
const RESERVED: [&str; 9] = [
    "AND",
    "OR",
    "NOT",
    "BETWEEN",
    "IN",
    "IS",
    "CONTAINS",
    "STARTSWITH",
    "ENDSWITH",
];

/// Two-character operator symbols, tried before the single-character set.
const DOUBLE_SYMBOLS: [&str; 3] = ["<>", "<=", ">="];

/// Single-character operator symbols.
const SINGLE_SYMBOLS: [char; 14] = [
    '[', ']', '(', ')', ',', '+', '-', '*', '/', '%', '^', '=', '<', '>',
];

/// A token in a filter clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// 1-based column where the lexeme starts.
    pub position: usize,
    /// The exact source lexeme.
    pub text: String,
    /// The token class.
    pub kind: TokenKind,
}

/// The class of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An operator or reserved word; `symbol` is the canonical uppercase form.
    Symbol {
        /// Canonical form, compared case-insensitively against the grammar.
        symbol: String,
    },
    /// An identifier: a potential field or function name.
    Named,
    /// A literal with its decoded payload.
    Value {
        /// The decoded literal value.
        value: Value,
    },
}

impl Token {
    /// The canonical symbol, if this token is a [`TokenKind::Symbol`].
    pub fn symbol(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Symbol { symbol } => Some(symbol),
            _ => None,
        }
    }

    /// Returns true if this token is the given canonical symbol.
    pub(crate) fn is_symbol(&self, symbol: &str) -> bool {
        self.symbol() == Some(symbol)
    }
}

/// Lexer for filter clauses.
///
/// Produces tokens tagged with their 1-based source column. The token
/// vector keeps source order, so the parser can peek across a token in
/// either direction by index.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    /// Creates a new lexer over the given clause.
    pub fn new(clause: &str) -> Self {
        Self {
            chars: clause.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenizes a whole clause.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Syntax`] at the first character no lexical
    /// rule applies to, quoting that character.
    pub fn tokenize(clause: &str) -> FilterResult<Vec<Token>> {
        let mut lexer = Self::new(clause);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Produces the next token, or `None` at end of input.
    fn next_token(&mut self) -> FilterResult<Option<Token>> {
        self.skip_whitespace();

        let Some(&c) = self.chars.get(self.pos) else {
            return Ok(None);
        };
        let start = self.pos;

        // Lexical rules are tried in a fixed order; the first match wins.
        if let Some(token) = self.char_literal(start) {
            return Ok(Some(token));
        }
        if let Some(token) = self.string_literal(start) {
            return Ok(Some(token));
        }
        if let Some(token) = self.number(start)? {
            return Ok(Some(token));
        }
        if let Some(token) = self.operator_symbol(start) {
            return Ok(Some(token));
        }
        if let Some(token) = self.word(start) {
            return Ok(Some(token));
        }

        Err(FilterError::Syntax {
            text: c.to_string(),
            position: start + 1,
        })
    }

    fn skip_whitespace(&mut self) {
        while self.chars.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// The source slice from `start` up to the current position.
    fn lexeme(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    /// `'X'` for a single non-escape character, or one of the escapes
    /// `'\\'`, `'\''`, `'\t'`, `'\r'`, `'\n'`.
    fn char_literal(&mut self, start: usize) -> Option<Token> {
        if self.chars.get(start) != Some(&'\'') {
            return None;
        }
        let (decoded, close) = match self.chars.get(start + 1) {
            Some('\\') => {
                let decoded = match self.chars.get(start + 2) {
                    Some('\\') => '\\',
                    Some('\'') => '\'',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('n') => '\n',
                    _ => return None,
                };
                (decoded, start + 3)
            }
            Some(&c) if c != '\'' => (c, start + 2),
            _ => return None,
        };
        if self.chars.get(close) != Some(&'\'') {
            return None;
        }
        self.pos = close + 1;
        Some(Token {
            position: start + 1,
            text: self.lexeme(start),
            kind: TokenKind::Value {
                value: Value::Char(decoded),
            },
        })
    }

    /// `"..."` with no embedded quote.
    fn string_literal(&mut self, start: usize) -> Option<Token> {
        if self.chars.get(start) != Some(&'"') {
            return None;
        }
        let mut end = start + 1;
        while let Some(&c) = self.chars.get(end) {
            if c == '"' {
                let inner: String = self.chars[start + 1..end].iter().collect();
                self.pos = end + 1;
                return Some(Token {
                    position: start + 1,
                    text: self.lexeme(start),
                    kind: TokenKind::Value {
                        value: Value::String(inner),
                    },
                });
            }
            end += 1;
        }
        None
    }

    /// `d+.d*`, `.d+`, or `d+`.
    fn number(&mut self, start: usize) -> FilterResult<Option<Token>> {
        let mut end = start;
        while self.chars.get(end).is_some_and(|c| c.is_ascii_digit()) {
            end += 1;
        }
        let has_integer_part = end > start;
        let mut is_decimal = false;
        if self.chars.get(end) == Some(&'.') {
            let mut fraction = end + 1;
            while self.chars.get(fraction).is_some_and(|c| c.is_ascii_digit()) {
                fraction += 1;
            }
            // `.` alone is not a lexeme; a bare dot needs fraction digits.
            if has_integer_part || fraction > end + 1 {
                is_decimal = true;
                end = fraction;
            }
        }
        if end == start {
            return Ok(None);
        }

        self.pos = end;
        let text = self.lexeme(start);
        let value = if is_decimal {
            match text.parse::<f64>() {
                Ok(d) => Value::Double(d),
                Err(_) => {
                    return Err(FilterError::Syntax {
                        text,
                        position: start + 1,
                    })
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(_) => {
                    return Err(FilterError::Syntax {
                        text,
                        position: start + 1,
                    })
                }
            }
        };
        Ok(Some(Token {
            position: start + 1,
            text,
            kind: TokenKind::Value { value },
        }))
    }

    fn operator_symbol(&mut self, start: usize) -> Option<Token> {
        let two: String = self.chars[start..self.chars.len().min(start + 2)]
            .iter()
            .collect();
        if DOUBLE_SYMBOLS.contains(&two.as_str()) {
            self.pos = start + 2;
            return Some(Token {
                position: start + 1,
                text: two.clone(),
                kind: TokenKind::Symbol { symbol: two },
            });
        }
        let c = *self.chars.get(start)?;
        if SINGLE_SYMBOLS.contains(&c) {
            self.pos = start + 1;
            return Some(Token {
                position: start + 1,
                text: c.to_string(),
                kind: TokenKind::Symbol {
                    symbol: c.to_string(),
                },
            });
        }
        None
    }

    /// A run of word characters, classified case-insensitively into the
    /// literals `null`/`true`/`false`, a reserved symbol, or a name.
    fn word(&mut self, start: usize) -> Option<Token> {
        let mut end = start;
        while self
            .chars
            .get(end)
            .is_some_and(|c| c.is_alphanumeric() || *c == '_')
        {
            end += 1;
        }
        if end == start {
            return None;
        }
        self.pos = end;
        let text = self.lexeme(start);
        let upper = text.to_uppercase();

        let kind = if upper == "NULL" {
            TokenKind::Value { value: Value::Null }
        } else if upper == "TRUE" {
            TokenKind::Value {
                value: Value::Bool(true),
            }
        } else if upper == "FALSE" {
            TokenKind::Value {
                value: Value::Bool(false),
            }
        } else if RESERVED.contains(&upper.as_str()) {
            TokenKind::Symbol { symbol: upper }
        } else {
            TokenKind::Named
        };
        Some(Token {
            position: start + 1,
            text,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(tokens: &[Token]) -> Vec<usize> {
        tokens.iter().map(|t| t.position).collect()
    }

    // ==================== Full Expression Tests ====================

    #[test]
    fn test_tokenize_full_expression() {
        let tokens = Lexer::tokenize("SomeField >= 1 AND OtherField = \"ABC\"").unwrap();
        assert_eq!(positions(&tokens), vec![1, 11, 14, 16, 20, 31, 33]);
        assert_eq!(tokens[1].symbol(), Some(">="));
        assert_eq!(tokens[3].symbol(), Some("AND"));
        assert_eq!(tokens[5].symbol(), Some("="));
        assert_eq!(tokens[0].kind, TokenKind::Named);
        assert_eq!(
            tokens[2].kind,
            TokenKind::Value {
                value: Value::Int(1)
            }
        );
        assert_eq!(
            tokens[6].kind,
            TokenKind::Value {
                value: Value::String("ABC".to_string())
            }
        );
    }

    #[test]
    fn test_token_stream_is_ordered_and_linked() {
        let tokens = Lexer::tokenize("A + B * (C - 1)").unwrap();
        // Positions strictly increase; each token's neighbors are the
        // adjacent vector entries, which is the doubly-linked invariant.
        for pair in tokens.windows(2) {
            assert!(pair[0].position < pair[1].position);
        }
        assert!(!tokens.is_empty());
    }

    // ==================== Literal Tests ====================

    #[test]
    fn test_tokenize_integer() {
        let tokens = Lexer::tokenize("42").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].position, 1);
        assert_eq!(tokens[0].text, "42");
        assert_eq!(
            tokens[0].kind,
            TokenKind::Value {
                value: Value::Int(42)
            }
        );
    }

    #[test]
    fn test_tokenize_decimal_forms() {
        let tokens = Lexer::tokenize("1.5 .5 7.").unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::Value {
                value: Value::Double(1.5)
            }
        );
        assert_eq!(
            tokens[1].kind,
            TokenKind::Value {
                value: Value::Double(0.5)
            }
        );
        assert_eq!(
            tokens[2].kind,
            TokenKind::Value {
                value: Value::Double(7.0)
            }
        );
    }

    #[test]
    fn test_tokenize_string_literal() {
        let tokens = Lexer::tokenize("\"hello world\"").unwrap();
        assert_eq!(tokens[0].text, "\"hello world\"");
        assert_eq!(
            tokens[0].kind,
            TokenKind::Value {
                value: Value::String("hello world".to_string())
            }
        );
    }

    #[test]
    fn test_tokenize_char_literal() {
        let tokens = Lexer::tokenize("'a'").unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::Value {
                value: Value::Char('a')
            }
        );
        assert_eq!(tokens[0].text, "'a'");
    }

    #[test]
    fn test_tokenize_char_escapes() {
        let cases = [
            ("'\\\\'", '\\'),
            ("'\\''", '\''),
            ("'\\t'", '\t'),
            ("'\\r'", '\r'),
            ("'\\n'", '\n'),
        ];
        for (source, expected) in cases {
            let tokens = Lexer::tokenize(source).unwrap();
            assert_eq!(
                tokens[0].kind,
                TokenKind::Value {
                    value: Value::Char(expected)
                },
                "source: {source}"
            );
            assert_eq!(tokens[0].text, source);
        }
    }

    #[test]
    fn test_tokenize_null_and_bools() {
        let tokens = Lexer::tokenize("null TRUE False").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Value { value: Value::Null });
        assert_eq!(
            tokens[1].kind,
            TokenKind::Value {
                value: Value::Bool(true)
            }
        );
        assert_eq!(
            tokens[2].kind,
            TokenKind::Value {
                value: Value::Bool(false)
            }
        );
    }

    // ==================== Symbol and Word Tests ====================

    #[test]
    fn test_tokenize_multi_char_symbols_win() {
        let tokens = Lexer::tokenize("a<>b<=c>=d<e>f").unwrap();
        let symbols: Vec<_> = tokens.iter().filter_map(|t| t.symbol()).collect();
        assert_eq!(symbols, vec!["<>", "<=", ">=", "<", ">"]);
    }

    #[test]
    fn test_tokenize_reserved_words_are_symbols() {
        for word in [
            "and",
            "Or",
            "NOT",
            "between",
            "In",
            "is",
            "Contains",
            "startswith",
            "ENDSWITH",
        ] {
            let tokens = Lexer::tokenize(word).unwrap();
            assert_eq!(
                tokens[0].symbol(),
                Some(word.to_uppercase().as_str()),
                "word: {word}"
            );
            assert_eq!(tokens[0].text, word);
        }
    }

    #[test]
    fn test_tokenize_identifier() {
        let tokens = Lexer::tokenize("Some_Field9").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Named);
        assert_eq!(tokens[0].text, "Some_Field9");
    }

    #[test]
    fn test_tokenize_indexer_and_call_symbols() {
        let tokens = Lexer::tokenize("MAX(Name[0], 'a')").unwrap();
        let symbols: Vec<_> = tokens.iter().filter_map(|t| t.symbol()).collect();
        assert_eq!(symbols, vec!["(", "[", "]", ",", ")"]);
    }

    // ==================== Error Tests ====================

    #[test]
    fn test_error_unknown_character() {
        let err = Lexer::tokenize("?").unwrap_err();
        assert_eq!(
            err,
            FilterError::Syntax {
                text: "?".to_string(),
                position: 1
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid syntax near '?' at position 1."
        );
    }

    #[test]
    fn test_error_unknown_character_mid_clause() {
        let err = Lexer::tokenize("A = #").unwrap_err();
        assert_eq!(
            err,
            FilterError::Syntax {
                text: "#".to_string(),
                position: 5
            }
        );
    }

    #[test]
    fn test_error_unterminated_string() {
        let err = Lexer::tokenize("\"abc").unwrap_err();
        assert_eq!(
            err,
            FilterError::Syntax {
                text: "\"".to_string(),
                position: 1
            }
        );
    }

    #[test]
    fn test_error_malformed_char_literal() {
        let err = Lexer::tokenize("'ab'").unwrap_err();
        assert_eq!(
            err,
            FilterError::Syntax {
                text: "'".to_string(),
                position: 1
            }
        );
    }
}
