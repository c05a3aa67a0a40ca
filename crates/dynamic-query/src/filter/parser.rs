//! Scope-context parser for filter clauses.
//!
//! Walks the token stream left-to-right with a cursor, combining each
//! token into an accumulated subtree. Operator precedence is not applied
//! here; the single forward pass yields a left-leaning tree that the
//! rebalancing pass in [`tree`](super::tree) repairs afterwards.

use super::error::{FilterError, FilterResult};
use super::lexer::{Token, TokenKind};
use super::tree::{self, TreeNode};

/// The stopping rule for the current parse frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeContext {
    /// Top level; nothing stops the frame.
    Root,
    /// Inside `( ... )`; stops at `)`.
    Scope,
    /// Inside a call or `IN` list; stops at `)` or `,`.
    Argument,
    /// Inside `[ ... ]`; stops at `]`.
    Index,
    /// The lower bound of `BETWEEN`; stops at `AND`.
    Between,
}

impl ScopeContext {
    fn stops_at(self, symbol: &str) -> bool {
        match self {
            ScopeContext::Root => false,
            ScopeContext::Scope => symbol == ")",
            ScopeContext::Argument => symbol == ")" || symbol == ",",
            ScopeContext::Index => symbol == "]",
            ScopeContext::Between => symbol == "AND",
        }
    }
}

/// Parser for filter clause token streams.
pub(crate) struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    /// Parses the token stream into a raw (left-leaning) parse tree.
    pub(crate) fn parse(tokens: Vec<Token>) -> FilterResult<TreeNode> {
        if tokens.is_empty() {
            return Err(FilterError::EmptyClause);
        }
        let mut parser = Parser { tokens, index: 0 };
        parser.parse_subtree(ScopeContext::Root)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn previous(&self) -> Option<&Token> {
        self.index.checked_sub(1).map(|i| &self.tokens[i])
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.index + 1)
    }

    /// Moves onto the next token if there is one.
    fn advance(&mut self) -> bool {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Moves onto the next token, or fails at the current one.
    fn advance_or_err(&mut self) -> FilterResult<()> {
        if self.advance() {
            Ok(())
        } else {
            Err(self.syntax_error())
        }
    }

    fn syntax_error(&self) -> FilterError {
        FilterError::syntax(self.current())
    }

    /// Fails unless the cursor sits on the given canonical symbol.
    fn expect_symbol(&self, symbol: &str) -> FilterResult<()> {
        if self.current().is_symbol(symbol) {
            Ok(())
        } else {
            Err(self.syntax_error())
        }
    }

    /// Builds one subtree under the given scope context.
    ///
    /// Parses a first operand, then keeps combining the following tokens
    /// into the accumulator until the stream ends or the scope's stop
    /// symbol appears. The stop symbol is not consumed; the cursor rests
    /// on it for the caller.
    fn parse_subtree(&mut self, scope: ScopeContext) -> FilterResult<TreeNode> {
        let mut acc = self.parse_operand()?;
        while self.advance() {
            if let TokenKind::Symbol { symbol } = &self.current().kind {
                if scope.stops_at(symbol) {
                    break;
                }
            }
            acc = self.combine(acc)?;
        }
        Ok(acc)
    }

    /// Combines the current token into the accumulated subtree.
    fn combine(&mut self, acc: TreeNode) -> FilterResult<TreeNode> {
        if matches!(self.current().kind, TokenKind::Symbol { .. }) {
            self.apply_operation(Some(acc))
        } else {
            // Two adjacent operand tokens.
            Err(self.syntax_error())
        }
    }

    /// Parses one operand node: a literal, a field reference, a call, or
    /// a prefix operation.
    fn parse_operand(&mut self) -> FilterResult<TreeNode> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Symbol { .. } => self.apply_operation(None),
            TokenKind::Named => {
                self.check_adjacency()?;
                if self.peek_next().is_some_and(|t| t.is_symbol("(")) {
                    self.advance();
                    let arguments = self.parse_argument_list()?;
                    Ok(TreeNode::new(token, tree::PREC_LEAF, arguments))
                } else {
                    let mut node = TreeNode::leaf(token, true);
                    self.parse_index_if_any(&mut node)?;
                    Ok(node)
                }
            }
            TokenKind::Value { .. } => {
                self.check_adjacency()?;
                let mut node = TreeNode::leaf(token, false);
                self.parse_index_if_any(&mut node)?;
                Ok(node)
            }
        }
    }

    /// A value, field, or call may only open the clause or follow an
    /// operator symbol; `)` and `]` end an operand, so a fresh operand
    /// right after them is a syntax error.
    fn check_adjacency(&self) -> FilterResult<()> {
        match self.previous() {
            None => Ok(()),
            Some(prev) => match prev.symbol() {
                Some(")") | Some("]") | None => Err(self.syntax_error()),
                Some(_) => Ok(()),
            },
        }
    }

    /// Appends an index child when the operand is immediately indexed.
    fn parse_index_if_any(&mut self, node: &mut TreeNode) -> FilterResult<()> {
        if self.peek_next().is_some_and(|t| t.is_symbol("[")) {
            self.advance();
            self.advance_or_err()?;
            let index = self.parse_subtree(ScopeContext::Index)?;
            self.expect_symbol("]")?;
            node.children.push(index);
        }
        Ok(())
    }

    /// Parses `( expr, expr, ... )` with the cursor on `(`; consumes the
    /// closing `)` and returns the argument subtrees.
    fn parse_argument_list(&mut self) -> FilterResult<Vec<TreeNode>> {
        let mut arguments = Vec::new();
        if self.peek_next().is_some_and(|t| t.is_symbol(")")) {
            self.advance();
            return Ok(arguments);
        }
        loop {
            self.advance_or_err()?;
            arguments.push(self.parse_subtree(ScopeContext::Argument)?);
            if self.current().is_symbol(",") {
                continue;
            }
            self.expect_symbol(")")?;
            return Ok(arguments);
        }
    }

    /// Prefix position: the start of the clause, or right after an
    /// operator symbol. `)` and `]` close an operand, so a sign after
    /// them is binary.
    fn prefix_position(&self) -> bool {
        match self.previous() {
            None => true,
            Some(prev) => matches!(prev.symbol(), Some(s) if s != ")" && s != "]"),
        }
    }

    /// Dispatches a symbol token to its operation rule.
    fn apply_operation(&mut self, left: Option<TreeNode>) -> FilterResult<TreeNode> {
        let token = self.current().clone();
        let TokenKind::Symbol { symbol } = token.kind.clone() else {
            return Err(self.syntax_error());
        };

        match symbol.as_str() {
            "(" => {
                if left.is_some() || !self.prefix_position() {
                    return Err(self.syntax_error());
                }
                self.scope(token)
            }
            "+" | "-" if self.prefix_position() => self.unary(token, &symbol),
            "NOT" => {
                if !self.prefix_position() {
                    return Err(self.syntax_error());
                }
                self.unary(token, &symbol)
            }
            "^" => self.binary(token, tree::PREC_POWER, left),
            "*" | "/" | "%" => self.binary(token, tree::PREC_MULTIPLICATIVE, left),
            "+" | "-" => self.binary(token, tree::PREC_ADDITIVE, left),
            "<" | ">" | "<=" | ">=" | "=" | "<>" | "CONTAINS" | "STARTSWITH" | "ENDSWITH" => {
                self.binary(token, tree::PREC_COMPARISON, left)
            }
            "BETWEEN" => self.between(token, left),
            "IS" => self.binary(token, tree::PREC_IS, left),
            "AND" => self.binary(token, tree::PREC_AND, left),
            "OR" => self.binary(token, tree::PREC_OR, left),
            "IN" => self.choice(token, left),
            _ => Err(self.syntax_error()),
        }
    }

    /// `( expr )` — a scoped subtree; the node is a rebalancing barrier.
    fn scope(&mut self, token: Token) -> FilterResult<TreeNode> {
        self.advance_or_err()?;
        let inner = self.parse_subtree(ScopeContext::Scope)?;
        self.expect_symbol(")")?;
        Ok(TreeNode::new(token, tree::PREC_LEAF, vec![inner]))
    }

    /// A prefix `+`, `-`, or `NOT`. The sign glyphs are re-tagged as
    /// `[+]`/`[-]` so the transformer can tell them from their binary
    /// namesakes.
    fn unary(&mut self, token: Token, symbol: &str) -> FilterResult<TreeNode> {
        let marker = match symbol {
            "+" => "[+]",
            "-" => "[-]",
            other => other,
        };
        let token = Token {
            kind: TokenKind::Symbol {
                symbol: marker.to_string(),
            },
            ..token
        };
        self.advance_or_err()?;
        let operand = self.parse_operand()?;
        Ok(TreeNode::new(token, tree::PREC_UNARY, vec![operand]))
    }

    fn binary(
        &mut self,
        token: Token,
        precedence: u8,
        left: Option<TreeNode>,
    ) -> FilterResult<TreeNode> {
        let Some(left) = left else {
            return Err(FilterError::syntax(&token));
        };
        self.advance_or_err()?;
        let right = self.parse_operand()?;
        Ok(TreeNode::new(token, precedence, vec![left, right]))
    }

    /// `left BETWEEN lower AND upper` — the lower bound is a full
    /// subexpression stopping at `AND`, the upper bound a single node.
    fn between(&mut self, token: Token, left: Option<TreeNode>) -> FilterResult<TreeNode> {
        let Some(left) = left else {
            return Err(FilterError::syntax(&token));
        };
        self.advance_or_err()?;
        let lower = self.parse_subtree(ScopeContext::Between)?;
        self.expect_symbol("AND")?;
        self.advance_or_err()?;
        let upper = self.parse_operand()?;
        Ok(TreeNode::new(
            token,
            tree::PREC_COMPARISON,
            vec![left, lower, upper],
        ))
    }

    /// `left IN ( choice, choice, ... )` — at least one choice.
    fn choice(&mut self, token: Token, left: Option<TreeNode>) -> FilterResult<TreeNode> {
        let Some(left) = left else {
            return Err(FilterError::syntax(&token));
        };
        self.advance_or_err()?;
        self.expect_symbol("(")?;
        let choices = self.parse_argument_list()?;
        if choices.is_empty() {
            return Err(self.syntax_error());
        }
        let mut children = vec![left];
        children.extend(choices);
        Ok(TreeNode::new(token, tree::PREC_LEAF, children))
    }
}
