//! Recursive-descent parser with precedence-climbing expressions.
//!
//! Statements are dispatched on the leading token (spec §4.2); expressions
//! are parsed by a chain of functions, one per precedence level, from
//! lowest (`||`) to highest (`call`/primary).

use crate::ast::{BinaryOp, Expr, InterpPart, Literal, NamedArgs, Stmt, UnaryOp};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::position::Position;
use crate::token::{Token, TokenKind};

const DEFAULT_CATCH_VAR: &str = "error";

/// Tokens that close an expression or statement; see the glossary's
/// "statement-end marker".
fn is_end_marker(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof)
}

fn can_start_primary(kind: &TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Number | String | True | False | Null | Variable | Identifier | LBracket | LBrace | LParen
    )
}

/// Punctuation that suppresses the preceding space in unquoted-text mode.
fn suppresses_space(kind: &TokenKind) -> bool {
    use TokenKind::*;
    matches!(kind, Bang | Colon | Dot | Comma | Semicolon | RParen | RBracket | RBrace)
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_source(source: &str) -> Result<Vec<Stmt>, ParseError> {
        let tokens = Lexer::tokenize(source)?;
        Parser::new(tokens).parse_program()
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> TokenKind {
        self.current().kind.clone()
    }

    fn position(&self) -> Position {
        self.current().position()
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind.clone())
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.kind() == kind
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.kind() == kind {
            Ok(self.advance())
        } else {
            Err(ParseError::new(
                format!("Expected {what}, found '{}'", self.current().raw),
                self.position(),
            ))
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.kind(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while self.kind() == TokenKind::Newline {
            self.advance();
        }
    }

    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.skip_separators();
        let mut stmts = Vec::new();
        while self.kind() != TokenKind::Eof {
            stmts.push(self.parse_statement()?);
            self.skip_separators();
        }
        Ok(stmts)
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_separators();
        let mut stmts = Vec::new();
        while !matches!(self.kind(), TokenKind::RBrace | TokenKind::Eof) {
            stmts.push(self.parse_statement()?);
            self.skip_separators();
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(stmts)
    }

    // ---- statements -----------------------------------------------------

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        use TokenKind::*;
        let pos = self.position();
        match self.kind() {
            Set => self.parse_set(),
            Variable => self.parse_bare_assignment(),
            Print | Log => self.parse_print(),
            If => self.parse_if(),
            Loop => self.parse_loop(),
            While => self.parse_while(),
            Foreach | For => self.parse_foreach(),
            Break => {
                self.advance();
                Ok(Stmt::Break(pos))
            }
            Continue => {
                self.advance();
                Ok(Stmt::Continue(pos))
            }
            Return => self.parse_return(),
            Def | Func | Function => self.parse_function_def(),
            Call => self.parse_call_statement(),
            Try => self.parse_try_catch(),
            On => self.parse_on(),
            Emit => self.parse_emit(),
            Launch | Open => self.parse_launch(),
            Close => self.parse_close(),
            Wait | Sleep => self.parse_wait(),
            Focus => self.parse_single_target(Focus, |target, pos| Stmt::Focus { target, pos }),
            Minimize => self.parse_single_target(Minimize, |target, pos| Stmt::Minimize { target, pos }),
            Maximize => self.parse_single_target(Maximize, |target, pos| Stmt::Maximize { target, pos }),
            Write => self.parse_write(),
            Read => self.parse_read(),
            Mkdir => self.parse_single_target(Mkdir, |path, pos| Stmt::Mkdir { path, pos }),
            Delete | Rm => self.parse_single_target(Delete, |path, pos| Stmt::Delete { path, pos }),
            Alert => self.parse_alert(),
            Confirm => self.parse_confirm(),
            Prompt => self.parse_prompt(),
            Notify => self.parse_notify(),
            Play => self.parse_play(),
            Stop => self.parse_stop(),
            Video => self.parse_video(),
            Identifier => self.parse_command(),
            _ => Err(ParseError::new(
                format!("Unexpected token '{}' at start of statement", self.current().raw),
                pos,
            )),
        }
    }

    fn parse_set(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // set
        let name = self.expect(TokenKind::Variable, "a variable name")?.value;
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expression()?;
        Ok(Stmt::Set { name, value, pos })
    }

    fn parse_bare_assignment(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        let name = self.advance().value;
        self.expect(TokenKind::Eq, "'=' in bare assignment")?;
        let value = self.parse_expression()?;
        Ok(Stmt::Set { name, value, pos })
    }

    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // print | log
        let target = self.parse_message_expr(true)?;
        Ok(Stmt::Print { target, pos })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // if
        let condition = self.parse_expression()?;
        if self.kind() == TokenKind::Then {
            self.advance();
        }
        let then_branch = self.parse_block()?;
        let mut else_branch = Vec::new();
        self.skip_newlines_before_else();
        if self.kind() == TokenKind::Else {
            self.advance();
            else_branch = self.parse_block()?;
        }
        Ok(Stmt::If { condition, then_branch, else_branch, pos })
    }

    /// `else` may appear on its own line after the closing `}` of `if`.
    fn skip_newlines_before_else(&mut self) {
        let mut lookahead = self.pos;
        while matches!(self.tokens.get(lookahead).map(|t| &t.kind), Some(TokenKind::Newline)) {
            lookahead += 1;
        }
        if matches!(self.tokens.get(lookahead).map(|t| &t.kind), Some(TokenKind::Else)) {
            self.pos = lookahead;
        }
    }

    fn parse_loop(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // loop
        if self.kind() == TokenKind::While {
            self.advance();
            let condition = self.parse_expression()?;
            let body = self.parse_block()?;
            return Ok(Stmt::While { condition, body, pos });
        }
        let count = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Stmt::Loop { count, body, pos })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // while
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { condition, body, pos })
    }

    fn parse_foreach(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // foreach | for
        let var = self.expect(TokenKind::Variable, "a loop variable")?.value;
        self.expect(TokenKind::In, "'in'")?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Stmt::ForEach { var, iterable, body, pos })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // return
        let value = if is_end_marker(&self.kind()) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Ok(Stmt::Return(value, pos))
    }

    fn parse_function_def(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // def | func | function
        let name = self.expect(TokenKind::Identifier, "a function name")?.value;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        while self.kind() != TokenKind::RParen {
            params.push(self.expect(TokenKind::Variable, "a parameter name")?.value);
            if self.kind() == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(Stmt::FunctionDef { name, params, body, pos })
    }

    fn parse_call_statement(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // call
        let name = self.expect(TokenKind::Identifier, "a function name")?.value;
        let args = self.parse_primary_arg_list()?;
        Ok(Stmt::Call { name, args, pos })
    }

    fn parse_try_catch(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // try
        let try_body = self.parse_block()?;
        self.expect(TokenKind::Catch, "'catch'")?;
        let err_name = if self.kind() == TokenKind::Variable {
            self.advance().value
        } else {
            DEFAULT_CATCH_VAR.to_owned()
        };
        let catch_body = self.parse_block()?;
        Ok(Stmt::TryCatch { try_body, err_name, catch_body, pos })
    }

    fn parse_event_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect(TokenKind::Identifier, "an event name")?.value;
        while self.kind() == TokenKind::Colon {
            self.advance();
            name.push(':');
            name.push_str(&self.expect(TokenKind::Identifier, "an event name segment")?.value);
        }
        Ok(name)
    }

    fn parse_on(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // on
        let event_name = self.parse_event_name()?;
        let body = self.parse_block()?;
        Ok(Stmt::On { event_name, body, pos })
    }

    /// `key=<expr>` pairs, as long as the lookahead is `IDENTIFIER '='`.
    fn parse_named_args(&mut self) -> Result<NamedArgs, ParseError> {
        let mut payload = Vec::new();
        while self.kind() == TokenKind::Identifier && self.peek_kind_at(1) == TokenKind::Eq {
            let key = self.advance().value;
            self.advance(); // '='
            let value = self.parse_expression()?;
            payload.push((key, value));
        }
        Ok(payload)
    }

    fn parse_emit(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // emit
        let event_name = self.parse_event_name()?;
        let payload = self.parse_named_args()?;
        Ok(Stmt::Emit { event_name, payload, pos })
    }

    fn parse_launch(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // launch | open
        let app_id = self.parse_postfix()?;
        let mut params = Vec::new();
        if self.kind() == TokenKind::With {
            self.advance();
            params = self.parse_named_args()?;
        }
        Ok(Stmt::Launch { app_id, params, pos })
    }

    fn parse_close(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // close
        let target = if is_end_marker(&self.kind()) { None } else { Some(self.parse_expression()?) };
        Ok(Stmt::Close { target, pos })
    }

    fn parse_wait(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // wait | sleep
        let duration = self.parse_expression()?;
        Ok(Stmt::Wait { duration, pos })
    }

    fn parse_single_target(
        &mut self,
        _keyword: TokenKind,
        build: impl FnOnce(Expr, Position) -> Stmt,
    ) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance();
        let target = self.parse_expression()?;
        Ok(build(target, pos))
    }

    fn parse_write(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // write
        let content = self.parse_expression()?;
        self.expect(TokenKind::To, "'to'")?;
        let path = self.parse_expression()?;
        Ok(Stmt::Write { content, path, pos })
    }

    fn parse_read(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // read
        let path = self.parse_expression()?;
        self.expect(TokenKind::Into, "'into'")?;
        let var = self.expect(TokenKind::Variable, "a variable")?.value;
        Ok(Stmt::Read { path, var, pos })
    }

    /// Expression-or-unquoted-text target used by `print`/`log`/`alert`/`notify`.
    fn parse_message_expr(&mut self, allow_unquoted: bool) -> Result<Expr, ParseError> {
        if self.kind() == TokenKind::String || !allow_unquoted {
            self.parse_expression()
        } else {
            self.parse_unquoted_text()
        }
    }

    fn parse_alert(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // alert
        let message = self.parse_message_expr(true)?;
        Ok(Stmt::Alert { message, pos })
    }

    fn parse_confirm(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // confirm
        let message = self.parse_expression()?;
        let var = if self.kind() == TokenKind::Into {
            self.advance();
            Some(self.expect(TokenKind::Variable, "a variable")?.value)
        } else {
            None
        };
        Ok(Stmt::Confirm { message, var, pos })
    }

    fn parse_prompt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // prompt
        let message = self.parse_expression()?;
        let default = if self.kind() == TokenKind::Default {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };
        let var = if self.kind() == TokenKind::Into {
            self.advance();
            Some(self.expect(TokenKind::Variable, "a variable")?.value)
        } else {
            None
        };
        Ok(Stmt::Prompt { message, default, var, pos })
    }

    fn parse_notify(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // notify
        let message = self.parse_message_expr(true)?;
        Ok(Stmt::Notify { message, pos })
    }

    fn parse_play(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // play
        let source = self.parse_postfix()?;
        let params = self.parse_named_args()?;
        Ok(Stmt::Play { source, params, pos })
    }

    fn parse_stop(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // stop
        let source = if is_end_marker(&self.kind()) { None } else { Some(self.parse_expression()?) };
        Ok(Stmt::Stop { source, pos })
    }

    fn parse_video(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        self.advance(); // video
        let source = self.parse_postfix()?;
        let params = self.parse_named_args()?;
        Ok(Stmt::Video { source, params, pos })
    }

    fn parse_command(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.position();
        let name = self.advance().value;
        let args = self.parse_primary_arg_list()?;
        Ok(Stmt::Command { name, args, pos })
    }

    /// Consumes primary-expression arguments (spec §4.2) until a
    /// statement-end marker or a non-primary-starting token.
    fn parse_primary_arg_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        while can_start_primary(&self.kind()) {
            args.push(self.parse_postfix()?);
        }
        Ok(args)
    }

    /// Unquoted-text interpolation used by `print`/`log`/`alert`/`notify`
    /// when the leading token isn't a `STRING`. Concatenates token text with
    /// single spaces, suppressing the space before closing/joining
    /// punctuation, splicing in `$name` variables and `call name arg*`
    /// expressions, and treating `+` as a bare join point (no literal
    /// character, no inserted space) so `$s + "c"` reads the same as string
    /// concatenation in expression mode.
    fn parse_unquoted_text(&mut self) -> Result<Expr, ParseError> {
        let pos = self.position();
        let mut parts = Vec::new();
        let mut buffer = String::new();
        // `+` glues neighboring pieces with no literal character and no
        // inserted space, mirroring string concatenation in expression mode.
        let mut suppress_next_space = false;

        while !is_end_marker(&self.kind()) {
            if self.kind() == TokenKind::Plus {
                self.advance();
                suppress_next_space = true;
                continue;
            }
            if self.kind() == TokenKind::Variable {
                if !buffer.is_empty() {
                    parts.push(InterpPart::Text(std::mem::take(&mut buffer)));
                }
                let token = self.advance();
                let pos = token.position();
                parts.push(InterpPart::Expr(Expr::Variable(token.value, pos)));
                suppress_next_space = false;
            } else if self.kind() == TokenKind::Call {
                // `call` never appears as literal printable text, so a
                // `call name arg*` run embedded in the message is spliced
                // in and evaluated, the same way `$name` is.
                if !buffer.is_empty() {
                    parts.push(InterpPart::Text(std::mem::take(&mut buffer)));
                }
                parts.push(InterpPart::Expr(self.parse_primary()?));
                suppress_next_space = false;
            } else {
                let token = self.advance();
                let text = if token.kind == TokenKind::String { &token.value } else { &token.raw };
                if !buffer.is_empty() && !suppress_next_space && !suppresses_space(&token.kind) {
                    buffer.push(' ');
                }
                buffer.push_str(text);
                suppress_next_space = false;
            }
        }
        if !buffer.is_empty() {
            parts.push(InterpPart::Text(buffer));
        }

        if parts.is_empty() {
            Ok(Expr::Literal(Literal::String(String::new()), pos))
        } else {
            Ok(Expr::InterpolatedString { parts, pos })
        }
    }

    // ---- expressions (precedence climbing) ------------------------------

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.kind() == TokenKind::OrOr {
            let pos = self.position();
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary { op: BinaryOp::Or, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.kind() == TokenKind::AndAnd {
            let pos = self.position();
            self.advance();
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary { op: BinaryOp::And, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let op = match self.kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            let pos = self.position();
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            let pos = self.position();
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let pos = self.position();
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let pos = self.position();
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.position();
        let op = match self.kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.parse_unary()?;
            Ok(Expr::Unary { op, expr: Box::new(expr), pos })
        } else {
            self.parse_postfix()
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.kind() {
                TokenKind::Dot => {
                    let pos = self.position();
                    self.advance();
                    let name = self.expect(TokenKind::Identifier, "a property name")?.value;
                    expr = Expr::Member { target: Box::new(expr), name, pos };
                }
                TokenKind::LBracket => {
                    let pos = self.position();
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr::Index { target: Box::new(expr), index: Box::new(index), pos };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.position();
        match self.kind() {
            TokenKind::Number => {
                let raw = self.advance().value;
                let n = raw.parse::<f64>().unwrap_or(0.0);
                Ok(Expr::Literal(Literal::Number(n), pos))
            }
            TokenKind::String => {
                let value = self.advance().value;
                Ok(Expr::Literal(Literal::String(value), pos))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true), pos))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false), pos))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Literal(Literal::Null, pos))
            }
            TokenKind::Variable => {
                let value = self.advance().value;
                Ok(Expr::Variable(value, pos))
            }
            TokenKind::Call => {
                self.advance();
                let name = self.expect(TokenKind::Identifier, "a function name")?.value;
                let args = self.parse_primary_arg_list()?;
                Ok(Expr::Call { name, args, pos })
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::Grouping { inner: Box::new(inner), pos })
            }
            TokenKind::Identifier => {
                // A bare identifier in expression position is a string literal.
                let value = self.advance().value;
                Ok(Expr::Literal(Literal::String(value), pos))
            }
            _ => Err(ParseError::new(
                format!("Unexpected token '{}' in expression", self.current().raw),
                pos,
            )),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let pos = self.position();
        self.advance(); // '['
        self.skip_newlines();
        let mut items = Vec::new();
        while self.kind() != TokenKind::RBracket {
            items.push(self.parse_expression()?);
            self.skip_newlines();
            if self.kind() == TokenKind::Comma {
                self.advance();
                self.skip_newlines();
            } else {
                break;
            }
        }
        self.skip_newlines();
        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Expr::Array { items, pos })
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let pos = self.position();
        self.advance(); // '{'
        self.skip_newlines();
        let mut entries = Vec::new();
        while self.kind() != TokenKind::RBrace {
            let key = match self.kind() {
                TokenKind::Identifier => self.advance().value,
                TokenKind::String => self.advance().value,
                _ => {
                    return Err(ParseError::new(
                        "Expected an identifier or string as object key",
                        self.position(),
                    ))
                }
            };
            self.expect(TokenKind::Colon, "':'")?;
            self.skip_newlines();
            let value = self.parse_expression()?;
            entries.push((key, value));
            self.skip_newlines();
            if self.kind() == TokenKind::Comma {
                self.advance();
                self.skip_newlines();
            } else {
                break;
            }
        }
        self.skip_newlines();
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Expr::Object { entries, pos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Vec<Stmt> {
        Parser::parse_source(src).unwrap()
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let stmts = parse("set $x = 2 + 3 * 4");
        match &stmts[0] {
            Stmt::Set { value, .. } => match value {
                Expr::Binary { op: BinaryOp::Add, rhs, .. } => {
                    assert!(matches!(**rhs, Expr::Binary { op: BinaryOp::Mul, .. }));
                }
                other => panic!("expected addition at top, got {other:?}"),
            },
            other => panic!("expected set, got {other:?}"),
        }
    }

    #[test]
    fn print_picks_expression_mode_for_leading_string() {
        let stmts = parse(r#"print "Hello" + $who"#);
        match &stmts[0] {
            Stmt::Print { target, .. } => assert!(matches!(target, Expr::Binary { .. })),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn print_picks_unquoted_text_mode_otherwise() {
        let stmts = parse("print hello $name!");
        match &stmts[0] {
            Stmt::Print { target: Expr::InterpolatedString { parts, .. }, .. } => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(parts[0], InterpPart::Text(_)));
                assert!(matches!(parts[1], InterpPart::Expr(_)));
                if let InterpPart::Text(t) = &parts[2] {
                    assert_eq!(t, "!");
                } else {
                    panic!("expected trailing text");
                }
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn unquoted_text_plus_glues_pieces_without_a_literal_sign() {
        let stmts = parse(r#"print $s + "c""#);
        match &stmts[0] {
            Stmt::Print { target: Expr::InterpolatedString { parts, .. }, .. } => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[0], InterpPart::Expr(_)));
                if let InterpPart::Text(t) = &parts[1] {
                    assert_eq!(t, "c");
                } else {
                    panic!("expected trailing text part with no leading '+' or space");
                }
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn unquoted_text_splices_in_a_call_expression() {
        let stmts = parse("print call fib 10");
        match &stmts[0] {
            Stmt::Print { target: Expr::InterpolatedString { parts, .. }, .. } => {
                assert_eq!(parts.len(), 1);
                assert!(matches!(parts[0], InterpPart::Expr(Expr::Call { .. })));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn loop_while_and_while_both_produce_while_stmt() {
        assert!(matches!(parse("loop while $x { }")[0], Stmt::While { .. }));
        assert!(matches!(parse("while $x { }")[0], Stmt::While { .. }));
        assert!(matches!(parse("loop 3 { }")[0], Stmt::Loop { .. }));
    }

    #[test]
    fn function_def_with_params() {
        let stmts = parse("def add($a, $b) { return $a + $b }");
        match &stmts[0] {
            Stmt::FunctionDef { name, params, .. } => {
                assert_eq!(name, "add");
                assert_eq!(params, &vec!["a".to_owned(), "b".to_owned()]);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn call_expression_consumes_primary_args_only() {
        let stmts = parse("set $r = call fib $a");
        match &stmts[0] {
            Stmt::Set { value: Expr::Call { name, args, .. }, .. } => {
                assert_eq!(name, "fib");
                assert_eq!(args.len(), 1);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn unknown_leading_identifier_is_command() {
        let stmts = parse("doSomething 1 2");
        match &stmts[0] {
            Stmt::Command { name, args, .. } => {
                assert_eq!(name, "doSomething");
                assert_eq!(args.len(), 2);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn object_and_array_literals_tolerate_newlines() {
        let stmts = parse("set $o = {\n  a: 1,\n  b: 2\n}\nset $arr = [\n1,\n2\n]");
        assert!(matches!(stmts[0], Stmt::Set { value: Expr::Object { .. }, .. }));
        assert!(matches!(stmts[1], Stmt::Set { value: Expr::Array { .. }, .. }));
    }

    #[test]
    fn event_names_join_colon_segments() {
        let stmts = parse("on window:open { }");
        match &stmts[0] {
            Stmt::On { event_name, .. } => assert_eq!(event_name, "window:open"),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn emit_parses_key_value_payload() {
        let stmts = parse("emit window:open x=1 y=2");
        match &stmts[0] {
            Stmt::Emit { event_name, payload, .. } => {
                assert_eq!(event_name, "window:open");
                assert_eq!(payload.len(), 2);
            }
            other => panic!("{other:?}"),
        }
    }
}
