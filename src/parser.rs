//! Recursive-descent parser and code generator.
//!
//! This is the scheduler of the whole compile: every grammar production
//! also drives the symbol tables and the VM writer, so there is no
//! separate AST pass. Emission order is therefore exactly the depth-first
//! traversal order of the grammar, with no tree ever materialized — a
//! deliberate choice (see spec's design notes) to keep the pipeline to a
//! single pass over the token stream.
//!
//! A single token of lookahead (`peek`/`peek_next`) is all the grammar
//! needs: bare identifiers, array subscripts, implicit-`this` method
//! calls, and qualified `Class.method` calls are disambiguated by the one
//! token that follows the leading identifier.

use crate::cursor::Cursor;
use crate::error::CompileError;
use crate::lexer::Lexer;
use crate::symbol_table::{SymbolKind, SymbolTable};
use crate::token::{Token, TokenKind, TokenSubkind};
use crate::vm::{Arithmetic, Segment, VmWriter};

type Tk = (TokenKind, TokenSubkind);

const TYPE_START: &[Tk] = &[
    (TokenKind::Keyword, TokenSubkind::Int),
    (TokenKind::Keyword, TokenSubkind::Char),
    (TokenKind::Keyword, TokenSubkind::Boolean),
    (TokenKind::Identifier, TokenSubkind::None),
];

const TERM_START: &[Tk] = &[
    (TokenKind::IntConstant, TokenSubkind::None),
    (TokenKind::StringConstant, TokenSubkind::None),
    (TokenKind::Identifier, TokenSubkind::None),
    (TokenKind::Symbol, TokenSubkind::LeftParen),
    (TokenKind::Symbol, TokenSubkind::Minus),
    (TokenKind::Symbol, TokenSubkind::Tilde),
    (TokenKind::Keyword, TokenSubkind::True),
    (TokenKind::Keyword, TokenSubkind::False),
    (TokenKind::Keyword, TokenSubkind::Null),
    (TokenKind::Keyword, TokenSubkind::This),
];

const BINARY_OPS: &[Tk] = &[
    (TokenKind::Symbol, TokenSubkind::Plus),
    (TokenKind::Symbol, TokenSubkind::Minus),
    (TokenKind::Symbol, TokenSubkind::Star),
    (TokenKind::Symbol, TokenSubkind::Slash),
    (TokenKind::Symbol, TokenSubkind::Ampersand),
    (TokenKind::Symbol, TokenSubkind::Pipe),
    (TokenKind::Symbol, TokenSubkind::LessThan),
    (TokenKind::Symbol, TokenSubkind::GreaterThan),
    (TokenKind::Symbol, TokenSubkind::Equal),
];

/// Resolves `name` in the subroutine table first, then the class table,
/// per the resolution order spec mandates. Returns owned data so callers
/// don't have to fight the borrow checker over which table the `&str`
/// came from.
fn resolve_name(
    subroutine: &SymbolTable,
    class: &SymbolTable,
    name: &str,
) -> (SymbolKind, usize, String) {
    let local = subroutine.resolve(name);
    if local.kind != SymbolKind::None {
        return (local.kind, local.index, local.type_name.to_owned());
    }
    let field = class.resolve(name);
    (field.kind, field.index, field.type_name.to_owned())
}

pub struct Parser<'a> {
    cursor: Cursor<'a, Token>,
    file: &'a str,
    class_name: String,
    if_counter: usize,
    while_counter: usize,
    class_table: SymbolTable,
    subroutine_table: SymbolTable,
    writer: VmWriter,
    error: Option<CompileError>,
    last_line: usize,
}

impl<'a> Parser<'a> {
    pub fn new(file: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            cursor: Cursor::new(tokens),
            file,
            class_name: String::new(),
            if_counter: 0,
            while_counter: 0,
            class_table: SymbolTable::new(),
            subroutine_table: SymbolTable::new(),
            writer: VmWriter::new(),
            error: None,
            last_line: 1,
        }
    }

    // ---- token-stream plumbing -------------------------------------

    fn current(&self) -> Option<&'a Token> {
        self.cursor.peek()
    }

    fn current_line(&self) -> usize {
        self.current().map(|t| t.line).unwrap_or(self.last_line)
    }

    fn record_error(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(CompileError::grammar(self.file, self.current_line(), message));
        }
    }

    /// Consumes and returns the current token. Past end of input this
    /// yields an inert error token rather than panicking, so a parser
    /// that ran off the end of a malformed file can still unwind.
    fn advance(&mut self) -> Token {
        match self.cursor.advance() {
            Some(tok) => {
                self.last_line = tok.line;
                tok.clone()
            }
            None => Token::error("", self.last_line),
        }
    }

    fn check(&self, expected: &[Tk]) -> bool {
        match self.current() {
            Some(tok) => expected.iter().any(|(k, s)| *k == tok.kind && *s == tok.subkind),
            None => false,
        }
    }

    /// Verifies the current token matches one of `expected`, recording a
    /// grammar error (only the first one survives) if it doesn't, then
    /// consumes it regardless so the parser keeps making progress.
    fn expect(&mut self, expected: &[Tk], label: &str) -> Token {
        if !self.check(expected) {
            let found = self
                .current()
                .map(|t| t.lexeme.clone())
                .unwrap_or_else(|| "end of input".to_owned());
            self.record_error(format!("expected {label}, found '{found}'"));
        }
        self.advance()
    }

    fn expect_type(&mut self) -> Token {
        self.expect(TYPE_START, "a type")
    }

    // ---- resolution + emission helpers ------------------------------

    fn resolve(&self, name: &str) -> (SymbolKind, usize, String) {
        resolve_name(&self.subroutine_table, &self.class_table, name)
    }

    /// Pushes a resolved variable's value. An unresolved (`None`-kind)
    /// identifier is an undeclared-variable use; per spec this does not
    /// hard-fail compilation, but it is surfaced as a warning and compiles
    /// to `push constant 0` rather than panicking on a segment that does
    /// not exist for `SymbolKind::None`.
    fn emit_push_resolved(&mut self, kind: SymbolKind, index: usize) {
        if kind == SymbolKind::None {
            log::warn!(
                "{}:{}: use of undeclared identifier as a variable",
                self.file,
                self.current_line()
            );
            self.writer.write_push(Segment::Constant, 0);
        } else {
            self.writer.write_push(kind.segment(), index);
        }
    }

    fn emit_pop_resolved(&mut self, kind: SymbolKind, index: usize) {
        if kind == SymbolKind::None {
            log::warn!(
                "{}:{}: assignment to undeclared identifier",
                self.file,
                self.current_line()
            );
            self.writer.write_pop(Segment::Temp, 0);
        } else {
            self.writer.write_pop(kind.segment(), index);
        }
    }

    // ---- grammar productions ----------------------------------------

    /// `class Id { classVarDec* subroutine* }`
    pub fn parse_class(&mut self) {
        self.class_table.reset();
        self.subroutine_table.reset();
        self.if_counter = 0;
        self.while_counter = 0;

        self.expect(&[(TokenKind::Keyword, TokenSubkind::Class)], "'class'");
        let name = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "class name");
        self.class_name = name.lexeme;
        self.expect(&[(TokenKind::Symbol, TokenSubkind::LeftBrace)], "'{'");

        while self.check(&[
            (TokenKind::Keyword, TokenSubkind::Static),
            (TokenKind::Keyword, TokenSubkind::Field),
        ]) {
            self.parse_class_var_dec();
        }

        while self.check(&[
            (TokenKind::Keyword, TokenSubkind::Constructor),
            (TokenKind::Keyword, TokenSubkind::Function),
            (TokenKind::Keyword, TokenSubkind::Method),
        ]) {
            self.parse_subroutine();
        }

        self.expect(&[(TokenKind::Symbol, TokenSubkind::RightBrace)], "'}'");
    }

    /// `('static'|'field') type Id (',' Id)* ';'`
    fn parse_class_var_dec(&mut self) {
        let kind_tok = self.expect(
            &[
                (TokenKind::Keyword, TokenSubkind::Static),
                (TokenKind::Keyword, TokenSubkind::Field),
            ],
            "'static' or 'field'",
        );
        let kind = if kind_tok.subkind == TokenSubkind::Static {
            SymbolKind::StaticF
        } else {
            SymbolKind::Field
        };

        let type_tok = self.expect_type();
        let type_name = type_tok.lexeme;

        let name = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "variable name");
        self.class_table.define(&name.lexeme, &type_name, kind);

        while self.check(&[(TokenKind::Symbol, TokenSubkind::Comma)]) {
            self.advance();
            let name = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "variable name");
            self.class_table.define(&name.lexeme, &type_name, kind);
        }

        self.expect(&[(TokenKind::Symbol, TokenSubkind::Semicolon)], "';'");
    }

    /// `('constructor'|'function'|'method') (type|'void') Id '(' params ')' subroutineBody`
    fn parse_subroutine(&mut self) {
        self.subroutine_table.reset();

        let kind_tok = self.expect(
            &[
                (TokenKind::Keyword, TokenSubkind::Constructor),
                (TokenKind::Keyword, TokenSubkind::Function),
                (TokenKind::Keyword, TokenSubkind::Method),
            ],
            "'constructor', 'function', or 'method'",
        );
        let subroutine_kind = kind_tok.subkind;

        if subroutine_kind == TokenSubkind::Method {
            let class_name = self.class_name.clone();
            self.subroutine_table.define("this", &class_name, SymbolKind::Arg);
        }

        // Return type: a declared type, or `void`. Neither is needed
        // again after the grammar accepts it — the VM target has no
        // static types.
        if !self.check(&[(TokenKind::Keyword, TokenSubkind::Void)]) {
            self.expect_type();
        } else {
            self.advance();
        }

        let name = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "subroutine name");
        self.expect(&[(TokenKind::Symbol, TokenSubkind::LeftParen)], "'('");
        self.parse_parameters();
        self.expect(&[(TokenKind::Symbol, TokenSubkind::RightParen)], "')'");

        self.expect(&[(TokenKind::Symbol, TokenSubkind::LeftBrace)], "'{'");
        while self.check(&[(TokenKind::Keyword, TokenSubkind::Var)]) {
            self.parse_var_dec();
        }

        // The `function` directive's local count must reflect the var
        // declarations just processed, not the parameter count — emitting
        // it before locals are counted (as the original did) produces a
        // wrong VM header.
        let n_locals = self.subroutine_table.var_count(SymbolKind::Var);
        self.writer
            .write_function(&format!("{}.{}", self.class_name, name.lexeme), n_locals);

        match subroutine_kind {
            TokenSubkind::Constructor => {
                let n_fields = self.class_table.var_count(SymbolKind::Field);
                self.writer.write_push(Segment::Constant, n_fields);
                self.writer.write_call("Memory.alloc", 1);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            TokenSubkind::Method => {
                self.writer.write_push(Segment::Argument, 0);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            _ => {}
        }

        self.parse_statements();
        self.expect(&[(TokenKind::Symbol, TokenSubkind::RightBrace)], "'}'");
    }

    /// `(type Id (',' type Id)*)?`
    fn parse_parameters(&mut self) {
        if !self.check(TYPE_START) {
            return;
        }
        self.parse_parameter();
        while self.check(&[(TokenKind::Symbol, TokenSubkind::Comma)]) {
            self.advance();
            self.parse_parameter();
        }
    }

    fn parse_parameter(&mut self) {
        let type_tok = self.expect_type();
        let name = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "parameter name");
        self.subroutine_table
            .define(&name.lexeme, &type_tok.lexeme, SymbolKind::Arg);
    }

    /// `'var' type Id (',' Id)* ';'`
    fn parse_var_dec(&mut self) {
        self.expect(&[(TokenKind::Keyword, TokenSubkind::Var)], "'var'");
        let type_tok = self.expect_type();
        let type_name = type_tok.lexeme;

        let name = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "variable name");
        self.subroutine_table.define(&name.lexeme, &type_name, SymbolKind::Var);

        while self.check(&[(TokenKind::Symbol, TokenSubkind::Comma)]) {
            self.advance();
            let name = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "variable name");
            self.subroutine_table.define(&name.lexeme, &type_name, SymbolKind::Var);
        }

        self.expect(&[(TokenKind::Symbol, TokenSubkind::Semicolon)], "';'");
    }

    /// `statement*`, where `statement := let | if | while | do | return`.
    fn parse_statements(&mut self) {
        loop {
            if self.check(&[(TokenKind::Keyword, TokenSubkind::Let)]) {
                self.parse_let();
            } else if self.check(&[(TokenKind::Keyword, TokenSubkind::If)]) {
                self.parse_if();
            } else if self.check(&[(TokenKind::Keyword, TokenSubkind::While)]) {
                self.parse_while();
            } else if self.check(&[(TokenKind::Keyword, TokenSubkind::Do)]) {
                self.parse_do();
            } else if self.check(&[(TokenKind::Keyword, TokenSubkind::Return)]) {
                self.parse_return();
            } else {
                break;
            }
        }
    }

    /// `'let' Id ('[' expr ']')? '=' expr ';'`
    fn parse_let(&mut self) {
        self.expect(&[(TokenKind::Keyword, TokenSubkind::Let)], "'let'");
        let name = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "variable name");
        let (kind, index, _type_name) = self.resolve(&name.lexeme);

        let is_array = self.check(&[(TokenKind::Symbol, TokenSubkind::LeftBracket)]);
        if is_array {
            self.advance();
            self.emit_push_resolved(kind, index);
            self.parse_expression();
            self.writer.write_arithmetic(Arithmetic::Add);
            self.expect(&[(TokenKind::Symbol, TokenSubkind::RightBracket)], "']'");
        }

        self.expect(&[(TokenKind::Symbol, TokenSubkind::Equal)], "'='");
        self.parse_expression();

        if is_array {
            // `that` cannot be set until the value is computed without
            // clobbering the address just computed on the stack, hence
            // the temp round-trip.
            self.writer.write_pop(Segment::Temp, 0);
            self.writer.write_pop(Segment::Pointer, 1);
            self.writer.write_push(Segment::Temp, 0);
            self.writer.write_pop(Segment::That, 0);
        } else {
            self.emit_pop_resolved(kind, index);
        }

        self.expect(&[(TokenKind::Symbol, TokenSubkind::Semicolon)], "';'");
    }

    /// `'if' '(' expr ')' '{' statements '}' ('else' '{' statements '}')?`
    fn parse_if(&mut self) {
        self.expect(&[(TokenKind::Keyword, TokenSubkind::If)], "'if'");
        self.expect(&[(TokenKind::Symbol, TokenSubkind::LeftParen)], "'('");
        self.parse_expression();
        self.expect(&[(TokenKind::Symbol, TokenSubkind::RightParen)], "')'");

        self.writer.write_arithmetic(Arithmetic::Not);
        let n = self.if_counter;
        self.if_counter += 1;
        let l_true = format!("{}_IF_TRUE_{}", self.class_name, n);
        let l_end = format!("{}_IF_END_{}", self.class_name, n);
        self.writer.write_if(&l_true);

        self.expect(&[(TokenKind::Symbol, TokenSubkind::LeftBrace)], "'{'");
        self.parse_statements();
        self.expect(&[(TokenKind::Symbol, TokenSubkind::RightBrace)], "'}'");
        self.writer.write_goto(&l_end);

        self.writer.write_label(&l_true);
        if self.check(&[(TokenKind::Keyword, TokenSubkind::Else)]) {
            self.advance();
            self.expect(&[(TokenKind::Symbol, TokenSubkind::LeftBrace)], "'{'");
            self.parse_statements();
            self.expect(&[(TokenKind::Symbol, TokenSubkind::RightBrace)], "'}'");
        }
        self.writer.write_label(&l_end);
    }

    /// `'while' '(' expr ')' '{' statements '}'`
    fn parse_while(&mut self) {
        self.expect(&[(TokenKind::Keyword, TokenSubkind::While)], "'while'");

        let n = self.while_counter;
        self.while_counter += 1;
        let l_start = format!("{}_WHILE_EXP_{}", self.class_name, n);
        let l_end = format!("{}_WHILE_END_{}", self.class_name, n);

        self.writer.write_label(&l_start);
        self.expect(&[(TokenKind::Symbol, TokenSubkind::LeftParen)], "'('");
        self.parse_expression();
        self.expect(&[(TokenKind::Symbol, TokenSubkind::RightParen)], "')'");
        self.writer.write_arithmetic(Arithmetic::Not);
        self.writer.write_if(&l_end);

        self.expect(&[(TokenKind::Symbol, TokenSubkind::LeftBrace)], "'{'");
        self.parse_statements();
        self.expect(&[(TokenKind::Symbol, TokenSubkind::RightBrace)], "'}'");
        self.writer.write_goto(&l_start);

        self.writer.write_label(&l_end);
    }

    /// `'do' subroutineCall ';'` — exactly a call, not a full expression;
    /// the call always produces a value (void subroutines return 0),
    /// which `do` discards.
    fn parse_do(&mut self) {
        self.expect(&[(TokenKind::Keyword, TokenSubkind::Do)], "'do'");
        self.parse_subroutine_call();
        self.writer.write_pop(Segment::Temp, 0);
        self.expect(&[(TokenKind::Symbol, TokenSubkind::Semicolon)], "';'");
    }

    /// `'return' expr? ';'`
    fn parse_return(&mut self) {
        self.expect(&[(TokenKind::Keyword, TokenSubkind::Return)], "'return'");
        if self.check(TERM_START) {
            self.parse_expression();
        } else {
            self.writer.write_push(Segment::Constant, 0);
        }
        self.writer.write_return();
        self.expect(&[(TokenKind::Symbol, TokenSubkind::Semicolon)], "';'");
    }

    /// `term (op term)*`, strictly left-associative with no operator
    /// precedence: each `op term` pair is folded in as it is read.
    fn parse_expression(&mut self) {
        self.parse_term();
        while self.check(BINARY_OPS) {
            let op = self.advance();
            self.parse_term();
            match op.subkind {
                TokenSubkind::Star => self.writer.write_call("Math.multiply", 2),
                TokenSubkind::Slash => self.writer.write_call("Math.divide", 2),
                TokenSubkind::Plus => self.writer.write_arithmetic(Arithmetic::Add),
                TokenSubkind::Minus => self.writer.write_arithmetic(Arithmetic::Sub),
                TokenSubkind::Ampersand => self.writer.write_arithmetic(Arithmetic::And),
                TokenSubkind::Pipe => self.writer.write_arithmetic(Arithmetic::Or),
                TokenSubkind::LessThan => self.writer.write_arithmetic(Arithmetic::Lt),
                TokenSubkind::GreaterThan => self.writer.write_arithmetic(Arithmetic::Gt),
                TokenSubkind::Equal => self.writer.write_arithmetic(Arithmetic::Eq),
                _ => unreachable!("BINARY_OPS only admits the nine operators above"),
            }
        }
    }

    /// `term := IntConst | StrConst | keywordConst | '(' expr ')'
    ///        | unaryOp term | Id | Id '[' expr ']' | subroutineCall`
    fn parse_term(&mut self) {
        let tok = match self.current() {
            Some(tok) => tok,
            None => {
                self.record_error("expected a term, found end of input");
                return;
            }
        };

        match (tok.kind, tok.subkind) {
            (TokenKind::IntConstant, _) => {
                let tok = self.advance();
                let value: usize = tok.lexeme.parse().unwrap_or(0);
                self.writer.write_push(Segment::Constant, value);
            }
            (TokenKind::StringConstant, _) => {
                let tok = self.advance();
                self.emit_string_literal(&tok.lexeme);
            }
            (TokenKind::Keyword, TokenSubkind::True) => {
                self.advance();
                self.writer.write_push(Segment::Constant, 0);
                self.writer.write_arithmetic(Arithmetic::Not);
            }
            (TokenKind::Keyword, TokenSubkind::False) | (TokenKind::Keyword, TokenSubkind::Null) => {
                self.advance();
                self.writer.write_push(Segment::Constant, 0);
            }
            (TokenKind::Keyword, TokenSubkind::This) => {
                self.advance();
                self.writer.write_push(Segment::Pointer, 0);
            }
            (TokenKind::Symbol, TokenSubkind::LeftParen) => {
                self.advance();
                self.parse_expression();
                self.expect(&[(TokenKind::Symbol, TokenSubkind::RightParen)], "')'");
            }
            (TokenKind::Symbol, TokenSubkind::Minus) => {
                self.advance();
                self.parse_term();
                self.writer.write_arithmetic(Arithmetic::Neg);
            }
            (TokenKind::Symbol, TokenSubkind::Tilde) => {
                self.advance();
                self.parse_term();
                self.writer.write_arithmetic(Arithmetic::Not);
            }
            (TokenKind::Identifier, _) => self.parse_identifier_term(),
            _ => {
                let lexeme = tok.lexeme.clone();
                self.record_error(format!("unexpected token '{lexeme}' in expression"));
                self.advance();
            }
        }
    }

    /// Disambiguates a leading identifier in term position using exactly
    /// one token of lookahead: `[` means array access, `(` means an
    /// implicit-`this` call, `.` means a qualified call, anything else
    /// means a bare variable read.
    fn parse_identifier_term(&mut self) {
        let lookahead = self.cursor.peek_next().map(|t| (t.kind, t.subkind));
        match lookahead {
            Some((TokenKind::Symbol, TokenSubkind::LeftBracket)) => self.parse_array_access(),
            Some((TokenKind::Symbol, TokenSubkind::LeftParen))
            | Some((TokenKind::Symbol, TokenSubkind::Dot)) => self.parse_subroutine_call(),
            _ => self.parse_bare_identifier(),
        }
    }

    fn parse_bare_identifier(&mut self) {
        let tok = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "identifier");
        let (kind, index, _type_name) = self.resolve(&tok.lexeme);
        self.emit_push_resolved(kind, index);
    }

    /// `Id '[' expr ']'` in value position: pushes `that 0` after pointing
    /// `that` at the computed element address.
    fn parse_array_access(&mut self) {
        let tok = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "identifier");
        let (kind, index, _type_name) = self.resolve(&tok.lexeme);
        self.emit_push_resolved(kind, index);
        self.expect(&[(TokenKind::Symbol, TokenSubkind::LeftBracket)], "'['");
        self.parse_expression();
        self.writer.write_arithmetic(Arithmetic::Add);
        self.expect(&[(TokenKind::Symbol, TokenSubkind::RightBracket)], "']'");
        self.writer.write_pop(Segment::Pointer, 1);
        self.writer.write_push(Segment::That, 0);
    }

    /// `subroutineCall := Id '(' exprList ')' | (Id '.' Id) '(' exprList ')'`
    ///
    /// Shared between `do` and `term`: a bare `Id(...)` is a method call on
    /// the implicit receiver; `Id.Name(...)` either calls a method on a
    /// known variable (receiver pushed, dispatched through its type) or,
    /// when `Id` resolves to nothing, a function on an external class
    /// (no receiver pushed).
    fn parse_subroutine_call(&mut self) {
        let first = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "subroutine call");

        if self.check(&[(TokenKind::Symbol, TokenSubkind::Dot)]) {
            self.advance();
            let method = self.expect(&[(TokenKind::Identifier, TokenSubkind::None)], "method name");
            self.expect(&[(TokenKind::Symbol, TokenSubkind::LeftParen)], "'('");

            let (kind, index, type_name) = self.resolve(&first.lexeme);
            let (call_name, receiver_args) = if kind != SymbolKind::None {
                self.emit_push_resolved(kind, index);
                (format!("{type_name}.{}", method.lexeme), 1)
            } else {
                (format!("{}.{}", first.lexeme, method.lexeme), 0)
            };

            let n_args = self.parse_expression_list();
            self.expect(&[(TokenKind::Symbol, TokenSubkind::RightParen)], "')'");
            self.writer.write_call(&call_name, n_args + receiver_args);
        } else {
            self.expect(&[(TokenKind::Symbol, TokenSubkind::LeftParen)], "'('");
            self.writer.write_push(Segment::Pointer, 0);
            let n_args = self.parse_expression_list();
            self.expect(&[(TokenKind::Symbol, TokenSubkind::RightParen)], "')'");
            self.writer
                .write_call(&format!("{}.{}", self.class_name, first.lexeme), n_args + 1);
        }
    }

    /// `(expr (',' expr)*)?`
    fn parse_expression_list(&mut self) -> usize {
        if !self.check(TERM_START) {
            return 0;
        }
        self.parse_expression();
        let mut count = 1;
        while self.check(&[(TokenKind::Symbol, TokenSubkind::Comma)]) {
            self.advance();
            self.parse_expression();
            count += 1;
        }
        count
    }

    fn emit_string_literal(&mut self, s: &str) {
        self.writer.write_push(Segment::Constant, s.len());
        self.writer.write_call("String.new", 1);
        for byte in s.bytes() {
            self.writer.write_push(Segment::Constant, byte as usize);
            self.writer.write_call("String.appendChar", 1);
        }
    }
}

/// Compiles one file's already-lexed-or-not source text into VM
/// instruction text, returning the first error encountered across lexing
/// and parsing (lexing runs to completion first, so a lexical error
/// always takes priority — it happened earlier in the pipeline).
pub fn compile_source(file: &str, source: &str) -> (String, Option<CompileError>) {
    let (tokens, lex_error) = Lexer::new(file, source).lex();
    let mut parser = Parser::new(file, &tokens);
    parser.parse_class();
    let vm_text = parser.writer.into_text();
    let error = lex_error.or(parser.error);
    (vm_text, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_ok(src: &str) -> Vec<String> {
        let (text, err) = compile_source("Test.jack", src);
        assert!(err.is_none(), "unexpected compile error: {err:?}");
        text.lines().map(|l| l.to_owned()).collect()
    }

    #[test]
    fn empty_class_emits_nothing() {
        assert_eq!(compile_ok("class Foo { }"), Vec::<String>::new());
    }

    #[test]
    fn constant_return() {
        let lines = compile_ok("class Foo { function int bar() { return 42; } }");
        assert_eq!(
            lines,
            vec!["function Foo.bar 0", "push constant 42", "return"]
        );
    }

    #[test]
    fn method_with_field_access() {
        let src = "class P { field int x;
            method int getX() { return x; } }";
        let lines = compile_ok(src);
        assert_eq!(
            lines,
            vec![
                "function P.getX 0",
                "push argument 0",
                "pop pointer 0",
                "push this 0",
                "return",
            ]
        );
    }

    #[test]
    fn constructor_allocating_two_fields() {
        let src = "class P { field int a, b; constructor P new() { let a = 0; let b = 0; return this; } }";
        let lines = compile_ok(src);
        assert_eq!(
            lines,
            vec![
                "function P.new 0",
                "push constant 2",
                "call Memory.alloc 1",
                "pop pointer 0",
                "push constant 0",
                "pop this 0",
                "push constant 0",
                "pop this 1",
                "push pointer 0",
                "return",
            ]
        );
    }

    #[test]
    fn string_literal() {
        let src = r#"class Foo { function void bar() { do Output.printString("Hi"); return; } }"#;
        let lines = compile_ok(src);
        assert_eq!(
            lines,
            vec![
                "function Foo.bar 0",
                "push constant 2",
                "call String.new 1",
                "push constant 72",
                "call String.appendChar 1",
                "push constant 105",
                "call String.appendChar 1",
                "call Output.printString 1",
                "pop temp 0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn while_with_nested_if_has_four_distinct_labels() {
        let src = "class Foo { function void bar() {
            while (x > 0) {
                if (x = 1) { let x = 0; }
                else { let x = x - 1; }
            }
            return;
        } }";
        let lines = compile_ok(src);
        let labels: Vec<_> = lines
            .iter()
            .filter_map(|l| l.strip_prefix("label "))
            .collect();
        assert_eq!(labels.len(), 4);
        let unique: std::collections::HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), 4, "labels must be unique: {labels:?}");
    }

    #[test]
    fn local_count_reflects_var_decs_not_params() {
        let src = "class Foo { function void bar(int a, int b) {
            var int x; var int y; var int z;
            return;
        } }";
        let lines = compile_ok(src);
        assert_eq!(lines[0], "function Foo.bar 3");
    }

    #[test]
    fn multiplication_and_division_call_math_library() {
        let lines = compile_ok("class Foo { function int bar() { return 2 * 3 / 4; } }");
        assert_eq!(
            lines,
            vec![
                "function Foo.bar 0",
                "push constant 2",
                "push constant 3",
                "call Math.multiply 2",
                "push constant 4",
                "call Math.divide 2",
                "return",
            ]
        );
    }

    #[test]
    fn expression_has_no_operator_precedence() {
        // 2 + 3 * 4 must compile as ((2 + 3) * 4), strictly left to right.
        let lines = compile_ok("class Foo { function int bar() { return 2 + 3 * 4; } }");
        assert_eq!(
            lines,
            vec![
                "function Foo.bar 0",
                "push constant 2",
                "push constant 3",
                "add",
                "push constant 4",
                "call Math.multiply 2",
                "return",
            ]
        );
    }

    #[test]
    fn array_assignment_uses_temp_swap() {
        let src = "class Foo { function void bar() { var Array a; let a[0] = 1; return; } }";
        let lines = compile_ok(src);
        assert_eq!(
            lines,
            vec![
                "function Foo.bar 1",
                "push local 0",
                "push constant 0",
                "add",
                "push constant 1",
                "pop temp 0",
                "pop pointer 1",
                "push temp 0",
                "pop that 0",
                "return",
            ]
        );
    }

    #[test]
    fn implicit_method_call_pushes_this_as_receiver() {
        let src = "class Foo { method void helper() { return; }
            method void bar() { do helper(); return; } }";
        let lines = compile_ok(src);
        // second function is `bar`
        let bar_start = lines.iter().position(|l| l == "function Foo.bar 0").unwrap();
        let bar = &lines[bar_start..];
        assert_eq!(
            bar,
            &[
                "function Foo.bar 0",
                "push argument 0",
                "pop pointer 0",
                "push pointer 0",
                "call Foo.helper 1",
                "pop temp 0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn qualified_call_on_known_variable_dispatches_through_its_type() {
        let src = "class Foo { function void bar() { var Array a; do a.dispose(); return; } }";
        let lines = compile_ok(src);
        assert_eq!(
            lines,
            vec![
                "function Foo.bar 1",
                "push local 0",
                "call Array.dispose 1",
                "pop temp 0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn qualified_call_on_unknown_name_is_treated_as_a_class() {
        let src = "class Foo { function void bar() { do Output.println(); return; } }";
        let lines = compile_ok(src);
        assert_eq!(
            lines,
            vec![
                "function Foo.bar 0",
                "call Output.println 0",
                "pop temp 0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn true_false_null_this_constants() {
        let src = "class P { method boolean test() {
            if (true) { return false; }
            return null;
        } }";
        let lines = compile_ok(src);
        assert!(lines.contains(&"not".to_owned()));
        // `true` compiles as push constant 0; not
        let idx = lines.iter().position(|l| l == "push constant 0").unwrap();
        assert_eq!(lines[idx + 1], "not");
    }

    #[test]
    fn grammar_error_is_reported_with_line_number() {
        let (_text, err) = compile_source("Bad.jack", "class Foo { field int; }");
        let err = err.expect("expected a grammar error");
        assert!(matches!(err, CompileError::Grammar { line: 1, .. }));
    }

    #[test]
    fn unary_minus_and_not() {
        let lines = compile_ok("class Foo { function int bar() { return -(~5); } }");
        assert_eq!(
            lines,
            vec![
                "function Foo.bar 0",
                "push constant 5",
                "not",
                "neg",
                "return",
            ]
        );
    }
}
