//! Recursive-descent parser: token sequence -> `Stylesheet` (spec.md §4.2).
//!
//! Grounded on the teacher's `eat_*` family (`eat_rules`, `eat_expr`,
//! `eat_ident`, `eat_variable_value` in `lib.rs`), generalized from inline
//! char consumption into a proper two-stage parse over a token vector.
//! `peekmore` gives the multi-token lookahead the mixin-definition-vs-call
//! and declaration-vs-rule disambiguation both need (spec.md §4.2).

pub mod ast;

use std::vec::IntoIter;

use codemap::Span;
use peekmore::{PeekMore, PeekMoreIterator};

use crate::common::{Combinator, CompareOp, ListSeparator, Op, QuoteKind};
use crate::error::{LessError, LessResult};
use crate::token::{Token, TokenKind};
use crate::unit::Unit;
use crate::value::{Number, Value};

use ast::*;

/// Bounds mixin-expansion-shaped nesting at parse time: deeply nested rule
/// bodies and parenthesized expressions (spec.md §5).
const MAX_NESTING_DEPTH: u32 = 100;

pub struct Parser {
    tokens: PeekMoreIterator<IntoIter<Token>>,
    eof: Token,
    depth: u32,
}

pub fn parse(tokens: Vec<Token>) -> LessResult<Stylesheet> {
    Parser::new(tokens).parse_stylesheet()
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Parser {
        let eof = tokens
            .last()
            .cloned()
            .expect("token stream must always end with an Eof token");
        Parser {
            tokens: tokens.into_iter().peekmore(),
            eof,
            depth: 0,
        }
    }

    // ---- token cursor helpers -------------------------------------------------

    fn peek(&mut self) -> Token {
        self.tokens.peek().cloned().unwrap_or_else(|| self.eof.clone())
    }

    fn peek_n(&mut self, n: usize) -> Token {
        self.tokens.peek_nth(n).cloned().unwrap_or_else(|| self.eof.clone())
    }

    fn bump(&mut self) -> Token {
        self.tokens.next().unwrap_or_else(|| self.eof.clone())
    }

    fn is_eof(&mut self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Skips trivia, collecting comment text for attachment to whatever
    /// statement follows (spec.md §4.1 "the parser attaches them as
    /// leading comments to the next statement").
    fn skip_trivia_collect_comments(&mut self) -> Vec<String> {
        let mut comments = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Newline => {
                    self.bump();
                }
                TokenKind::Comment { .. } => {
                    let tok = self.bump();
                    comments.push(tok.lexeme);
                }
                _ => break,
            }
        }
        comments
    }

    fn eat_symbol(&mut self, c: char) -> bool {
        if self.peek().is_symbol(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, c: char) -> LessResult<Token> {
        let tok = self.peek();
        if tok.is_symbol(c) {
            Ok(self.bump())
        } else {
            Err(LessError::parse(
                format!("expected '{}', found '{}'", c, tok.lexeme),
                tok.span,
            ))
        }
    }

    fn enter_nesting(&mut self, span: Span) -> LessResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(LessError::parse(
                "maximum nesting depth exceeded",
                span,
            ));
        }
        Ok(())
    }

    fn exit_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ---- top level --------------------------------------------------------

    pub fn parse_stylesheet(mut self) -> LessResult<Stylesheet> {
        let statements = self.parse_statement_list(true)?;
        Ok(Stylesheet { statements })
    }

    /// Parses statements until `}` (when `top_level` is false) or EOF.
    fn parse_statement_list(&mut self, top_level: bool) -> LessResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            let leading_comments = self.skip_trivia_collect_comments();
            if self.is_eof() {
                break;
            }
            if !top_level && self.peek().is_symbol('}') {
                break;
            }
            let stmt = self.parse_statement(leading_comments)?;
            statements.push(stmt);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self, leading_comments: Vec<String>) -> LessResult<Statement> {
        match self.peek().kind {
            TokenKind::AtKeyword => self.parse_at_keyword_statement(leading_comments),
            _ => self.parse_selector_shaped_statement(leading_comments),
        }
    }

    // ---- `@`-prefixed statements -------------------------------------------

    fn parse_at_keyword_statement(&mut self, leading_comments: Vec<String>) -> LessResult<Statement> {
        let name_tok = self.bump();
        let name = name_tok.lexeme.clone();

        // `@name: value;` -- a variable declaration.
        if self.peek().is_symbol(':') {
            self.bump();
            let value = self.parse_value_expr(ValueContext::declaration())?;
            self.eat_symbol(';');
            return Ok(Statement::VariableDeclaration(VariableDeclaration {
                name,
                value,
                leading_comments,
                span: name_tok.span,
            }));
        }

        // Otherwise, a (possibly unknown) at-rule: raw prelude, then
        // either `;` (no block) or a `{ ... }` block (spec.md §4.2).
        let mut prelude = String::new();
        let mut depth = 0i32;
        loop {
            match self.peek().kind {
                TokenKind::Symbol('{') if depth == 0 => break,
                TokenKind::Symbol(';') if depth == 0 => break,
                TokenKind::Symbol('}') if depth == 0 => break,
                TokenKind::Eof => break,
                TokenKind::Symbol('(') | TokenKind::Symbol('[') => {
                    depth += 1;
                    prelude.push_str(&self.bump().lexeme);
                }
                TokenKind::Symbol(')') | TokenKind::Symbol(']') => {
                    depth -= 1;
                    prelude.push_str(&self.bump().lexeme);
                }
                TokenKind::Newline => {
                    self.bump();
                    if !prelude.ends_with(' ') && !prelude.is_empty() {
                        prelude.push(' ');
                    }
                }
                TokenKind::Str(q) => {
                    let tok = self.bump();
                    prelude.push_str(&render_quoted(&tok.lexeme, q));
                }
                _ => {
                    let tok = self.bump();
                    prelude.push_str(&tok.lexeme);
                    prelude.push(' ');
                }
            }
        }
        let prelude = prelude.trim().to_string();

        let block = if self.eat_symbol('{') {
            self.enter_nesting(name_tok.span)?;
            let inner = self.parse_statement_list(false)?;
            self.expect_symbol('}')?;
            self.exit_nesting();
            AtRuleBlock::Statements(inner)
        } else {
            self.eat_symbol(';');
            if prelude.is_empty() {
                AtRuleBlock::None
            } else {
                AtRuleBlock::Raw(prelude.clone())
            }
        };

        Ok(Statement::AtRule(AtRule {
            name,
            parameters: prelude,
            block,
            span: name_tok.span,
        }))
    }

    // ---- rule / mixin-call / declaration disambiguation --------------------

    /// Scans ahead (without mutating parser state beyond the scan) to find
    /// whether the current statement's terminator is `{` (a rule) or `;`
    /// (a declaration or mixin call) -- spec.md §4.2's "a nested rule
    /// begins whenever the lookahead resembles a selector" is implemented
    /// here as a full scan-to-terminator rather than a literal
    /// one-token peek, which is simpler to get right and behaviorally
    /// equivalent (see DESIGN.md).
    fn scan_prelude(&mut self) -> LessResult<(Vec<Token>, char)> {
        let mut prelude = Vec::new();
        let mut depth = 0i32;
        let mut n = 0usize;
        loop {
            let tok = self.peek_n(n);
            match &tok.kind {
                TokenKind::Symbol('(') | TokenKind::Symbol('[') => {
                    depth += 1;
                    prelude.push(tok);
                }
                TokenKind::Symbol(')') | TokenKind::Symbol(']') => {
                    depth -= 1;
                    prelude.push(tok);
                }
                TokenKind::Symbol('{') if depth == 0 => {
                    for _ in 0..n {
                        self.bump();
                    }
                    return Ok((prelude, '{'));
                }
                TokenKind::Symbol(';') if depth == 0 => {
                    for _ in 0..n {
                        self.bump();
                    }
                    self.bump();
                    return Ok((prelude, ';'));
                }
                TokenKind::Symbol('}') if depth == 0 => {
                    for _ in 0..n {
                        self.bump();
                    }
                    return Ok((prelude, '}'));
                }
                TokenKind::Eof => {
                    return Err(LessError::parse(
                        "unexpected end of input while parsing a rule or declaration",
                        tok.span,
                    ));
                }
                _ => prelude.push(tok),
            }
            n += 1;
        }
    }

    fn parse_selector_shaped_statement(&mut self, leading_comments: Vec<String>) -> LessResult<Statement> {
        let start_span = self.peek().span;
        let (prelude, terminator) = self.scan_prelude()?;

        if terminator == '{' {
            return self.build_rule(prelude, leading_comments, start_span);
        }

        // terminator is ';' (already consumed) or '}' (not consumed, an
        // empty/terminated statement -- only reachable for a trailing
        // mixin call with no `;` right before the closing brace).
        if let Some(colon_idx) = top_level_colon_index(&prelude) {
            return self.build_declaration(prelude, colon_idx, start_span);
        }

        self.build_mixin_call_or_extend(prelude, start_span)
    }

    fn build_declaration(&self, prelude: Vec<Token>, colon_idx: usize, span: Span) -> LessResult<Statement> {
        let (name_toks, rest) = prelude.split_at(colon_idx);
        let value_toks = rest[1..].to_vec();
        let property = render_property_name(name_toks);
        let (important, value_toks) = strip_important(value_toks);
        let value = Parser::new(terminate(value_toks, span)).parse_value_expr(ValueContext::declaration())?;
        Ok(Statement::Declaration(Declaration {
            property,
            value,
            important,
            span,
        }))
    }

    fn build_mixin_call_or_extend(&self, prelude: Vec<Token>, span: Span) -> LessResult<Statement> {
        // `&:extend(.selector [all])` appearing as its own statement.
        if is_extend_form(&prelude) {
            let target = parse_extend_target(&prelude)?;
            // Represented as a zero-argument pseudo mixin-call so the
            // evaluator can fold it into the enclosing rule's `extends`
            // list without a dedicated `Statement` variant.
            return Ok(Statement::MixinCall(MixinCall {
                path: vec!["&:extend".to_string()],
                arguments: vec![Argument {
                    name: None,
                    value: Value::List(
                        vec![
                            Value::Keyword(render_selector_text(&target.selector)),
                            Value::keyword(if target.all { "all" } else { "" }),
                        ],
                        ListSeparator::Space,
                    ),
                }],
                important: false,
                span,
            }));
        }

        let (path, remainder) = parse_mixin_path(&prelude, span)?;
        let (important, remainder) = strip_important(remainder);
        let arguments = if let Some(Token { kind: TokenKind::Symbol('('), .. }) = remainder.first() {
            parse_call_arguments(&remainder)?
        } else {
            Vec::new()
        };
        Ok(Statement::MixinCall(MixinCall {
            path,
            arguments,
            important,
            span,
        }))
    }

    fn build_rule(&mut self, prelude: Vec<Token>, leading_comments: Vec<String>, span: Span) -> LessResult<Statement> {
        let (selector_toks, paren_toks) = split_at_top_level_paren(&prelude);
        let has_call_parens = paren_toks.is_some();

        let mut parameters = Vec::new();
        let mut guard = None;
        if let Some(inner) = paren_toks {
            parameters = parse_parameter_list(&inner)?;
        }

        // A `when (...)`/`unless (...)` guard may follow the parameter
        // list (or a bare selector, for `@media`-like guarded blocks is
        // not part of this grammar -- guards only attach to mixins).
        let (selector_toks, guard_toks) = split_guard(&selector_toks);
        if let Some(g) = guard_toks {
            guard = Some(parse_guard(&g)?);
        }

        let selector = parse_selector(&selector_toks)?;

        self.enter_nesting(span)?;
        let raw_body = self.parse_statement_list(false)?;
        self.expect_symbol('}')?;
        self.exit_nesting();

        let (body, extends) = extract_extends(raw_body);

        Ok(Statement::Rule(Rule {
            selector,
            body,
            parameters,
            guard,
            extends,
            leading_comments,
            has_call_parens,
            span,
        }))
    }

    // ---- value expression parsing (Pratt precedence, spec.md §4.2) --------

    pub fn parse_value_expr(&mut self, ctx: ValueContext) -> LessResult<Value> {
        let list = self.parse_comma_list(ctx)?;
        Ok(list)
    }

    fn parse_comma_list(&mut self, ctx: ValueContext) -> LessResult<Value> {
        let mut items = vec![self.parse_space_list(ctx)?];
        while self.peek().is_symbol(',') {
            self.bump();
            items.push(self.parse_space_list(ctx)?);
        }
        if items.len() == 1 {
            Ok(items.pop().unwrap())
        } else {
            Ok(Value::List(items, ListSeparator::Comma))
        }
    }

    fn parse_space_list(&mut self, ctx: ValueContext) -> LessResult<Value> {
        let mut items = vec![self.parse_additive(ctx)?];
        loop {
            match self.peek().kind {
                TokenKind::Symbol(')') | TokenKind::Symbol(';') | TokenKind::Symbol('}')
                | TokenKind::Symbol(',') | TokenKind::Eof | TokenKind::Newline => break,
                _ => items.push(self.parse_additive(ctx)?),
            }
        }
        if items.len() == 1 {
            Ok(items.pop().unwrap())
        } else {
            Ok(Value::List(items, ListSeparator::Space))
        }
    }

    fn parse_additive(&mut self, ctx: ValueContext) -> LessResult<Value> {
        let mut left = self.parse_multiplicative(ctx)?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Symbol('+') => Op::Add,
                // A bare '-' only binds as a binary operator when not the
                // start of a new list item (the space-list loop already
                // guards most of that); treated as subtraction here.
                TokenKind::Symbol('-') => Op::Sub,
                _ => break,
            };
            let op_span = self.bump().span;
            let right = self.parse_multiplicative(ctx)?;
            left = Value::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
                in_parens: ctx.in_parens,
                span: op_span,
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self, ctx: ValueContext) -> LessResult<Value> {
        let mut left = self.parse_unary(ctx)?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Symbol('*') => Op::Mul,
                TokenKind::Symbol('/') if ctx.allow_slash_as_operator => Op::Div,
                _ => break,
            };
            let op_span = self.bump().span;
            let right = self.parse_unary(ctx)?;
            left = Value::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
                in_parens: ctx.in_parens,
                span: op_span,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self, ctx: ValueContext) -> LessResult<Value> {
        self.parse_atom(ctx)
    }

    fn parse_atom(&mut self, ctx: ValueContext) -> LessResult<Value> {
        let tok = self.peek();
        match tok.kind {
            TokenKind::Symbol('(') => {
                self.bump();
                self.enter_nesting(tok.span)?;
                let inner_ctx = ValueContext {
                    in_parens: true,
                    allow_slash_as_operator: true,
                };
                let inner = self.parse_comma_list(inner_ctx)?;
                self.expect_symbol(')')?;
                self.exit_nesting();
                Ok(inner)
            }
            TokenKind::Symbol('~') => {
                self.bump();
                let str_tok = self.peek();
                if let TokenKind::Str(_) = str_tok.kind {
                    self.bump();
                    Ok(Value::Str(str_tok.lexeme, QuoteKind::None))
                } else {
                    Err(LessError::parse("expected string after '~'", str_tok.span))
                }
            }
            TokenKind::Str(q) => {
                self.bump();
                Ok(Value::Str(tok.lexeme, q))
            }
            TokenKind::Color => {
                self.bump();
                crate::color::Color::from_hex(&tok.lexeme)
                    .map(Value::Color)
                    .ok_or_else(|| LessError::parse("invalid color literal", tok.span))
            }
            TokenKind::Number => {
                self.bump();
                let n: f64 = tok.lexeme.parse().map_err(|_| {
                    LessError::parse(format!("invalid number '{}'", tok.lexeme), tok.span)
                })?;
                Ok(Value::Number(Number::unitless(n)))
            }
            TokenKind::Percentage => {
                self.bump();
                let digits = &tok.lexeme[..tok.lexeme.len() - 1];
                let n: f64 = digits.parse().map_err(|_| {
                    LessError::parse(format!("invalid percentage '{}'", tok.lexeme), tok.span)
                })?;
                Ok(Value::Number(Number::new(n, Unit::Percent)))
            }
            TokenKind::Dimension => {
                self.bump();
                let (num, unit) = split_dimension(&tok.lexeme);
                let n: f64 = num.parse().map_err(|_| {
                    LessError::parse(format!("invalid dimension '{}'", tok.lexeme), tok.span)
                })?;
                Ok(Value::Number(Number::new(n, Unit::parse(&unit))))
            }
            TokenKind::AtKeyword => {
                self.bump();
                Ok(Value::Variable(tok.lexeme, tok.span))
            }
            TokenKind::InterpolationOpen => {
                let open = self.bump();
                // `@{name}` is sugar for a variable reference (spec.md §4.2);
                // `#{...}` takes the general expression path.
                if open.lexeme == "@{"
                    && matches!(self.peek().kind, TokenKind::Ident)
                    && self.peek_n(1).is_symbol('}')
                {
                    let name_tok = self.bump();
                    self.expect_symbol('}')?;
                    return Ok(Value::Interpolation(Box::new(Value::Variable(
                        name_tok.lexeme,
                        name_tok.span,
                    ))));
                }
                let inner = self.parse_comma_list(ValueContext {
                    in_parens: true,
                    allow_slash_as_operator: true,
                })?;
                self.expect_symbol('}')?;
                Ok(Value::Interpolation(Box::new(inner)))
            }
            TokenKind::Ident => {
                self.bump();
                if tok.lexeme.eq_ignore_ascii_case("url") && self.peek().is_symbol('(') {
                    return self.parse_url_contents();
                }
                if self.peek().is_symbol('(') {
                    self.bump();
                    let mut args = Vec::new();
                    if !self.peek().is_symbol(')') {
                        args.push(self.parse_space_list(ValueContext {
                            in_parens: true,
                            allow_slash_as_operator: true,
                        })?);
                        while self.peek().is_symbol(',') {
                            self.bump();
                            args.push(self.parse_space_list(ValueContext {
                                in_parens: true,
                                allow_slash_as_operator: true,
                            })?);
                        }
                    }
                    self.expect_symbol(')')?;
                    return Ok(Value::FunctionCall(tok.lexeme, args, tok.span));
                }
                Ok(Value::Keyword(tok.lexeme))
            }
            TokenKind::Symbol('-') if matches!(self.peek_n(1).kind, TokenKind::AtKeyword) => {
                // `-@var` -- unary negation of a variable reference.
                self.bump();
                let inner = self.parse_atom(ctx)?;
                Ok(Value::BinaryOp {
                    left: Box::new(Value::Number(Number::unitless(0.0))),
                    op: Op::Sub,
                    right: Box::new(inner),
                    in_parens: ctx.in_parens,
                    span: tok.span,
                })
            }
            _ => {
                self.bump();
                Ok(Value::Keyword(tok.lexeme))
            }
        }
    }

    fn parse_url_contents(&mut self) -> LessResult<Value> {
        self.bump(); // '('
        let mut text = String::new();
        loop {
            match self.peek().kind {
                TokenKind::Symbol(')') => {
                    self.bump();
                    break;
                }
                TokenKind::Str(_) => {
                    let tok = self.bump();
                    text.push_str(&tok.lexeme);
                }
                TokenKind::Eof => {
                    return Err(LessError::parse("unterminated url(...)", self.peek().span));
                }
                _ => text.push_str(&self.bump().lexeme),
            }
        }
        Ok(Value::Url(text))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ValueContext {
    pub in_parens: bool,
    pub allow_slash_as_operator: bool,
}

impl ValueContext {
    /// Top-level declaration values: `/` outside parens is left as literal
    /// text (`font: 12px/1.4`), per spec.md §4.4.
    pub fn declaration() -> ValueContext {
        ValueContext {
            in_parens: false,
            allow_slash_as_operator: false,
        }
    }
}

// ---- free helper functions used by the disambiguation logic above --------

fn terminate(mut toks: Vec<Token>, fallback: Span) -> Vec<Token> {
    if !matches!(toks.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
        let span = toks.last().map(|t| t.span).unwrap_or(fallback);
        toks.push(Token::new(TokenKind::Eof, "", span));
    }
    toks
}

fn render_quoted(s: &str, q: QuoteKind) -> String {
    match q {
        QuoteKind::Double => format!("\"{}\"", s),
        QuoteKind::Single => format!("'{}'", s),
        QuoteKind::None => s.to_string(),
    }
}

fn split_dimension(lexeme: &str) -> (String, String) {
    let split_at = lexeme
        .find(|c: char| c.is_alphabetic())
        .unwrap_or(lexeme.len());
    (lexeme[..split_at].to_string(), lexeme[split_at..].to_string())
}

fn top_level_colon_index(toks: &[Token]) -> Option<usize> {
    let mut depth = 0i32;
    for (i, t) in toks.iter().enumerate() {
        match &t.kind {
            TokenKind::Symbol('(') | TokenKind::Symbol('[') => depth += 1,
            TokenKind::Symbol(')') | TokenKind::Symbol(']') => depth -= 1,
            TokenKind::Symbol(':') if depth == 0 => {
                // Not a declaration colon if it's immediately doubled
                // (`::before`) or preceded by nothing resembling a plain
                // property identifier run.
                if matches!(toks.get(i + 1).map(|t| &t.kind), Some(TokenKind::Symbol(':'))) {
                    continue;
                }
                return Some(i);
            }
            _ => {}
        }
    }
    None
}

fn render_property_name(toks: &[Token]) -> String {
    let mut s = String::new();
    for t in toks {
        match &t.kind {
            TokenKind::InterpolationOpen => s.push_str("@{"),
            _ => s.push_str(&t.lexeme),
        }
    }
    s.trim().to_string()
}

fn strip_important(mut toks: Vec<Token>) -> (bool, Vec<Token>) {
    // `!important` lexes as Symbol('!') Ident("important").
    if toks.len() >= 2 {
        let n = toks.len();
        if toks[n - 1].lexeme.eq_ignore_ascii_case("important")
            && matches!(toks[n - 1].kind, TokenKind::Ident)
            && toks[n - 2].is_symbol('!')
        {
            toks.truncate(n - 2);
            return (true, toks);
        }
    }
    (false, toks)
}

fn split_at_top_level_paren(toks: &[Token]) -> (Vec<Token>, Option<Vec<Token>>) {
    let mut depth = 0i32;
    for (i, t) in toks.iter().enumerate() {
        match &t.kind {
            TokenKind::Symbol('(') => {
                if depth == 0 {
                    let mut inner_depth = 1i32;
                    let mut j = i + 1;
                    while j < toks.len() && inner_depth > 0 {
                        match &toks[j].kind {
                            TokenKind::Symbol('(') => inner_depth += 1,
                            TokenKind::Symbol(')') => inner_depth -= 1,
                            _ => {}
                        }
                        j += 1;
                    }
                    let inner = toks[i + 1..j.saturating_sub(1)].to_vec();
                    return (toks[..i].to_vec(), Some(inner));
                }
                depth += 1;
            }
            TokenKind::Symbol(')') => depth -= 1,
            _ => {}
        }
    }
    (toks.to_vec(), None)
}

fn split_guard(toks: &[Token]) -> (Vec<Token>, Option<Vec<Token>>) {
    for (i, t) in toks.iter().enumerate() {
        if let TokenKind::Ident = t.kind {
            if t.lexeme.eq_ignore_ascii_case("when") || t.lexeme.eq_ignore_ascii_case("unless") {
                return (toks[..i].to_vec(), Some(toks[i..].to_vec()));
            }
        }
    }
    (toks.to_vec(), None)
}

fn parse_guard(toks: &[Token]) -> LessResult<Guard> {
    let negate = toks[0].lexeme.eq_ignore_ascii_case("unless");
    let keyword_span = toks[0].span;
    let rest = &toks[1..];
    // Split on top-level `,` into disjunctive groups; each group splits on
    // the `and` keyword into a conjunction (spec.md §4.2 "Guards").
    let groups_toks = split_top_level(rest, |t| t.is_symbol(','));
    let mut groups = Vec::new();
    for group in groups_toks {
        let conds_toks = split_top_level(&group, |t| {
            matches!(&t.kind, TokenKind::Ident) && t.lexeme.eq_ignore_ascii_case("and")
        });
        let mut conds = Vec::new();
        for cond in conds_toks {
            conds.push(parse_guard_condition(&cond, keyword_span)?);
        }
        groups.push(conds);
    }
    Ok(Guard { groups, negate })
}

fn parse_guard_condition(toks: &[Token], fallback: Span) -> LessResult<GuardCondition> {
    // Conditions are wrapped in `(...)`; strip one layer if present.
    let toks: Vec<Token> = if toks.first().map_or(false, |t| t.is_symbol('(')) {
        toks[1..toks.len().saturating_sub(1)].to_vec()
    } else {
        toks.to_vec()
    };
    let op_idx = toks.iter().position(|t| {
        matches!(t.kind, TokenKind::Comparison(_)) || t.is_symbol('>') || t.is_symbol('<')
    });
    match op_idx {
        Some(idx) => {
            let op_span = toks[idx].span;
            let op = match &toks[idx].kind {
                TokenKind::Comparison(op) => *op,
                TokenKind::Symbol('>') => CompareOp::Gt,
                TokenKind::Symbol('<') => CompareOp::Lt,
                _ => unreachable!(),
            };
            let left = Parser::new(terminate(toks[..idx].to_vec(), op_span))
                .parse_value_expr(ValueContext::declaration())?;
            let right = Parser::new(terminate(toks[idx + 1..].to_vec(), op_span))
                .parse_value_expr(ValueContext::declaration())?;
            Ok(GuardCondition { left, op, right })
        }
        None => {
            // A bare truthy expression, e.g. `when (ismobile)`.
            let left = Parser::new(terminate(toks, fallback)).parse_value_expr(ValueContext::declaration())?;
            Ok(GuardCondition {
                left,
                op: CompareOp::Eq,
                right: Value::keyword("true"),
            })
        }
    }
}

fn split_top_level(toks: &[Token], is_sep: impl Fn(&Token) -> bool) -> Vec<Vec<Token>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0i32;
    for t in toks {
        match &t.kind {
            TokenKind::Symbol('(') => depth += 1,
            TokenKind::Symbol(')') => depth -= 1,
            _ => {}
        }
        if depth == 0 && is_sep(t) {
            groups.push(std::mem::take(&mut current));
            continue;
        }
        current.push(t.clone());
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

fn parse_parameter_list(toks: &[Token]) -> LessResult<Vec<Parameter>> {
    let groups = split_top_level(toks, |t| t.is_symbol(',') || t.is_symbol(';'));
    let mut params = Vec::new();
    for group in groups {
        if group.is_empty() {
            continue;
        }
        if group.len() >= 3 && group[0].is_symbol('.') && group[1].is_symbol('.') && group[2].is_symbol('.') {
            params.push(Parameter { name: String::new(), default: None, is_rest: true });
            continue;
        }
        let name_tok = &group[0];
        let name = name_tok.lexeme.clone();
        if group.len() > 1 && group[1].is_symbol(':') {
            let default = Parser::new(terminate(group[2..].to_vec(), name_tok.span))
                .parse_value_expr(ValueContext::declaration())?;
            params.push(Parameter { name, default: Some(default), is_rest: false });
        } else if group.len() > 1 && group[1].is_symbol('.') {
            params.push(Parameter { name, default: None, is_rest: true });
        } else {
            params.push(Parameter { name, default: None, is_rest: false });
        }
    }
    Ok(params)
}

fn parse_mixin_path(toks: &[Token], statement_span: Span) -> LessResult<(Vec<String>, Vec<Token>)> {
    // Namespaced selector path: `.a > .b` or `#ns .mixin`, split on
    // combinators/whitespace into segments, stopping at the first `(`.
    let mut path = Vec::new();
    let mut current = String::new();
    let mut i = 0;
    while i < toks.len() {
        match &toks[i].kind {
            TokenKind::Symbol('(') => break,
            TokenKind::Symbol('>') => {
                if !current.is_empty() {
                    path.push(std::mem::take(&mut current));
                }
            }
            _ => current.push_str(&toks[i].lexeme),
        }
        i += 1;
    }
    if !current.is_empty() {
        path.push(current);
    }
    if path.is_empty() {
        return Err(LessError::parse(
            "expected a mixin selector path",
            toks.first().map(|t| t.span).unwrap_or(statement_span),
        ));
    }
    Ok((path, toks[i..].to_vec()))
}

fn parse_call_arguments(toks: &[Token]) -> LessResult<Vec<Argument>> {
    // toks[0] is '(' ... toks[last] is ')'.
    let inner = &toks[1..toks.len().saturating_sub(1)];
    let groups = split_top_level(inner, |t| t.is_symbol(',') || t.is_symbol(';'));
    let mut args = Vec::new();
    for group in groups {
        if group.is_empty() {
            continue;
        }
        if group.len() > 1 && matches!(group[0].kind, TokenKind::AtKeyword) && group[1].is_symbol(':') {
            let name = group[0].lexeme.clone();
            let name_span = group[0].span;
            let value = Parser::new(terminate(group[2..].to_vec(), name_span))
                .parse_value_expr(ValueContext::declaration())?;
            args.push(Argument { name: Some(name), value });
        } else {
            let group_span = group[0].span;
            let value = Parser::new(terminate(group, group_span))
                .parse_value_expr(ValueContext { in_parens: true, allow_slash_as_operator: true })?;
            args.push(Argument { name: None, value });
        }
    }
    Ok(args)
}

fn is_extend_form(toks: &[Token]) -> bool {
    toks.len() >= 2 && toks[0].is_symbol('&') && toks[1].is_symbol(':') && toks.iter().any(|t| {
        matches!(t.kind, TokenKind::Ident) && t.lexeme.eq_ignore_ascii_case("extend")
    })
}

fn parse_extend_target(toks: &[Token]) -> LessResult<ExtendTarget> {
    let paren_idx = toks
        .iter()
        .position(|t| t.is_symbol('('))
        .ok_or_else(|| LessError::parse("expected '(' after :extend", toks[0].span))?;
    let close_idx = toks
        .iter()
        .rposition(|t| t.is_symbol(')'))
        .ok_or_else(|| LessError::parse("expected ')' to close :extend", toks[0].span))?;
    let inner = &toks[paren_idx + 1..close_idx];
    let all = inner.last().map_or(false, |t| {
        matches!(t.kind, TokenKind::Ident) && t.lexeme.eq_ignore_ascii_case("all")
    });
    let selector_toks = if all { &inner[..inner.len() - 1] } else { inner };
    let selector = parse_selector(selector_toks)?;
    Ok(ExtendTarget { selector, all })
}

fn render_selector_text(selector: &Selector) -> String {
    selector
        .parts
        .iter()
        .map(|p| {
            p.atoms
                .iter()
                .map(|a| match a {
                    SelectorAtom::Text(t) => t.clone(),
                    SelectorAtom::Parent => "&".to_string(),
                    SelectorAtom::Combinator(c) => c.as_str().trim().to_string(),
                    SelectorAtom::Interpolation(_) => String::new(),
                })
                .collect::<Vec<_>>()
                .join("")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Splits a rule body's statements out of any `&:extend(...)` pseudo-calls
/// produced by `build_mixin_call_or_extend`, attaching them to the rule's
/// own `extends` list (spec.md §3 invariant (c): extends attach to the
/// *parent* rule, never a sibling).
fn extract_extends(stmts: Vec<Statement>) -> (Vec<Statement>, Vec<ExtendTarget>) {
    let mut body = Vec::with_capacity(stmts.len());
    let mut extends = Vec::new();
    for stmt in stmts {
        match stmt {
            Statement::MixinCall(MixinCall { path, arguments, .. }) if path == ["&:extend".to_string()] => {
                if let Some(Argument { value: Value::List(items, _), .. }) = arguments.into_iter().next() {
                    if let [Value::Keyword(sel_text), Value::Keyword(all_flag)] = &items[..] {
                        extends.push(ExtendTarget {
                            selector: Selector::from_text(sel_text),
                            all: all_flag == "all",
                        });
                    }
                }
            }
            other => body.push(other),
        }
    }
    (body, extends)
}

/// Parses raw selector tokens into `Selector` parts, handling `&`, `>`/`+`/
/// `~` combinators, and `@{}`/`#{}` interpolation (spec.md §4.4 "Nesting
/// expansion").
fn parse_selector(toks: &[Token]) -> LessResult<Selector> {
    let groups = split_top_level(toks, |t| t.is_symbol(','));
    let mut parts = Vec::new();
    for group in groups {
        if group.is_empty() {
            continue;
        }
        let mut atoms: Vec<SelectorAtom> = Vec::new();
        let mut text = String::new();
        // A byte gap between one token's end and the next token's start
        // means whitespace (or a comment) was skipped between them --
        // significant for a single-line compound selector like `.a .b`,
        // which must stay a descendant combination rather than collapse
        // into `.a.b` (spec.md §4.2, testable invariant #1). Downstream
        // `normalize_whitespace` in `eval/selector.rs` collapses any
        // resulting run of spaces, so it's safe to mark a gap before any
        // atom, not just a bare text run.
        let mut prev_end: Option<codemap::Pos> = None;
        let mut i = 0;
        while i < group.len() {
            let t = &group[i];
            let gap = prev_end.map_or(false, |end| end != t.span.low());
            if gap && (!text.is_empty() || !atoms.is_empty()) {
                if text.is_empty() {
                    atoms.push(SelectorAtom::Text(" ".to_string()));
                } else if !text.ends_with(' ') {
                    text.push(' ');
                }
            }
            match &t.kind {
                TokenKind::Symbol('&') => {
                    if !text.is_empty() {
                        atoms.push(SelectorAtom::Text(std::mem::take(&mut text)));
                    }
                    atoms.push(SelectorAtom::Parent);
                }
                TokenKind::Symbol('>') | TokenKind::Symbol('+') | TokenKind::Symbol('~') => {
                    if !text.is_empty() {
                        atoms.push(SelectorAtom::Text(std::mem::take(&mut text)));
                    }
                    if let TokenKind::Symbol(c) = t.kind {
                        if let Some(comb) = Combinator::from_char(c) {
                            atoms.push(SelectorAtom::Combinator(comb));
                        }
                    }
                }
                TokenKind::InterpolationOpen => {
                    // Collect balanced tokens up to the matching `}`.
                    let mut depth = 1i32;
                    let mut j = i + 1;
                    while j < group.len() && depth > 0 {
                        match &group[j].kind {
                            TokenKind::Symbol('{') => depth += 1,
                            TokenKind::Symbol('}') => depth -= 1,
                            _ => {}
                        }
                        if depth > 0 {
                            j += 1;
                        }
                    }
                    let open_span = t.span;
                    let inner = group[i + 1..j].to_vec();
                    // `@{name}` is sugar for a variable reference (spec.md
                    // §4.2); `#{...}` and any richer `@{...}` body take the
                    // general expression path.
                    let value = match &inner[..] {
                        [ident] if t.lexeme == "@{" && matches!(ident.kind, TokenKind::Ident) => {
                            Value::Variable(ident.lexeme.clone(), ident.span)
                        }
                        _ => Parser::new(terminate(inner, open_span))
                            .parse_value_expr(ValueContext::declaration())?,
                    };
                    if !text.is_empty() {
                        atoms.push(SelectorAtom::Text(std::mem::take(&mut text)));
                    }
                    atoms.push(SelectorAtom::Interpolation(value));
                    i = j;
                }
                _ => {
                    text.push_str(&t.lexeme);
                }
            }
            prev_end = Some(group[i].span.high());
            i += 1;
        }
        if !text.is_empty() {
            atoms.push(SelectorAtom::Text(text));
        }
        parts.push(SelectorPart { atoms });
    }
    Ok(Selector { parts })
}
