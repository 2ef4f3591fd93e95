//! Dump parser - single left-to-right scan.
//!
//! Converts the compiler's textual AST dump into [`Form`] trees. The dump
//! grammar is loose: tokens are separated by whitespace and parentheses,
//! except inside a handful of protected regions where spaces and
//! parentheses are literal token characters:
//!
//! - `"..."` quoted strings,
//! - `key='...'` single-quoted attribute values,
//! - `key=[...]` bracketed attribute values (source ranges),
//! - `"<...>` generic annotations following a quoted name.
//!
//! In [`ParseMode::Single`] the text must hold exactly one balanced root
//! form. [`ParseMode::Multi`] accepts several roots back to back and treats a
//! dangling `)` as a unit boundary instead of an error.

use tracing::{trace, warn};

use crate::diagnostics::{to_error_source, SourceArc};
use crate::syntax::{Atom, Form, Node, Span};
use crate::{err_ctx, JsonGenError};

const SOURCE_NAME: &str = "<dump>";

const UNBALANCED_HELP: &str = "the compiler likely produced malformed output for some \
construct; moving the offending declarations into a separate file usually works around it";

/// How many root forms a dump may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Exactly one root form.
    #[default]
    Single,
    /// Any number of root forms, e.g. dumps of several files concatenated.
    Multi,
}

/// Parses a dump holding exactly one root form.
pub fn parse(text: &str) -> Result<Form, JsonGenError> {
    let mut roots = parse_with_mode(text, ParseMode::Single)?;
    // Single mode never yields more than one root.
    roots.pop().ok_or_else(|| {
        let src = to_error_source(SOURCE_NAME, text);
        err_ctx!(
            Parse,
            "expected '(' at the start of the dump",
            &src,
            Span { start: 0, end: 0 }
        )
    })
}

/// Parses a dump holding any number of root forms.
pub fn parse_units(text: &str) -> Result<Vec<Form>, JsonGenError> {
    parse_with_mode(text, ParseMode::Multi)
}

pub fn parse_with_mode(text: &str, mode: ParseMode) -> Result<Vec<Form>, JsonGenError> {
    let mut scanner = Scanner::new(text, mode);
    for (pos, c) in text.char_indices() {
        scanner.step(pos, c)?;
    }
    scanner.finish()
}

/// Region in which separators are literal characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    /// `"..."`
    Str,
    /// `='...'`
    Attr,
    /// `=[...]`, with nesting depth
    Bracket(usize),
    /// `"<...>`, with nesting depth
    Angle(usize),
}

struct Scanner<'a> {
    text: &'a str,
    mode: ParseMode,
    /// Ancestors of `current`, outermost first.
    stack: Vec<Form>,
    current: Option<Form>,
    /// Byte offsets of the `(` that opened each form on the stack plus `current`.
    opens: Vec<usize>,
    token: String,
    token_start: usize,
    quote: Quote,
    quote_start: usize,
    roots: Vec<Form>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, mode: ParseMode) -> Self {
        Scanner {
            text,
            mode,
            stack: Vec::new(),
            current: None,
            opens: Vec::new(),
            token: String::new(),
            token_start: 0,
            quote: Quote::None,
            quote_start: 0,
            roots: Vec::new(),
        }
    }

    fn source(&self) -> SourceArc {
        to_error_source(SOURCE_NAME, self.text)
    }

    fn error(&self, message: &str, span: Span) -> JsonGenError {
        err_ctx!(Parse, message, &self.source(), span)
    }

    fn step(&mut self, pos: usize, c: char) -> Result<(), JsonGenError> {
        if self.quote != Quote::None {
            self.step_quoted(c);
            return Ok(());
        }

        match c {
            '(' => {
                self.flush(pos)?;
                self.open(pos)?;
            }
            ')' => {
                self.flush(pos)?;
                self.close(pos)?;
            }
            c if c.is_whitespace() => self.flush(pos)?,
            '"' => self.begin_quote(pos, c, Quote::Str),
            '\'' if self.token.ends_with('=') => self.begin_quote(pos, c, Quote::Attr),
            '[' if self.token.ends_with('=') => self.begin_quote(pos, c, Quote::Bracket(1)),
            '<' if self.token.ends_with('"') => self.begin_quote(pos, c, Quote::Angle(1)),
            c => self.push_char(pos, c),
        }
        Ok(())
    }

    fn begin_quote(&mut self, pos: usize, c: char, quote: Quote) {
        self.push_char(pos, c);
        self.quote = quote;
        self.quote_start = pos;
    }

    fn step_quoted(&mut self, c: char) {
        self.token.push(c);
        self.quote = match (self.quote, c) {
            (Quote::Str, '"') | (Quote::Attr, '\'') => Quote::None,
            (Quote::Bracket(depth), '[') => Quote::Bracket(depth + 1),
            (Quote::Bracket(1), ']') => Quote::None,
            (Quote::Bracket(depth), ']') => Quote::Bracket(depth - 1),
            (Quote::Angle(depth), '<') => Quote::Angle(depth + 1),
            (Quote::Angle(1), '>') => Quote::None,
            (Quote::Angle(depth), '>') => Quote::Angle(depth - 1),
            (quote, _) => quote,
        };
    }

    fn push_char(&mut self, pos: usize, c: char) {
        if self.token.is_empty() {
            self.token_start = pos;
        }
        self.token.push(c);
    }

    /// Stores the pending token in the current form.
    fn flush(&mut self, pos: usize) -> Result<(), JsonGenError> {
        if self.token.is_empty() {
            return Ok(());
        }
        let token = std::mem::take(&mut self.token);
        match self.current.as_mut() {
            Some(form) if form.name.is_empty() && form.items.is_empty() => form.name = token,
            Some(form) => form.items.push(Node::Atom(Atom::from_token(&token))),
            None => {
                let span = Span {
                    start: self.token_start,
                    end: pos,
                };
                match self.mode {
                    ParseMode::Single => {
                        return Err(self.error("unexpected text outside of a form", span));
                    }
                    ParseMode::Multi => {
                        warn!(token = %token, offset = span.start, "ignoring text between dump units");
                    }
                }
            }
        }
        Ok(())
    }

    fn open(&mut self, pos: usize) -> Result<(), JsonGenError> {
        match self.current.take() {
            Some(parent) => self.stack.push(parent),
            None if self.mode == ParseMode::Single && !self.roots.is_empty() => {
                let span = Span {
                    start: pos,
                    end: self.text.len(),
                };
                return Err(self.error("unexpected content after the root form", span));
            }
            None => {}
        }
        self.current = Some(Form::default());
        self.opens.push(pos);
        Ok(())
    }

    fn close(&mut self, pos: usize) -> Result<(), JsonGenError> {
        let Some(done) = self.current.take() else {
            let span = Span {
                start: pos,
                end: pos + 1,
            };
            return match self.mode {
                ParseMode::Single => Err(self.error("unbalanced ')'", span)),
                ParseMode::Multi => {
                    trace!(offset = pos, "dangling ')' treated as unit boundary");
                    Ok(())
                }
            };
        };
        self.opens.pop();

        match self.stack.pop() {
            Some(mut parent) => {
                parent.items.push(Node::Form(done));
                self.current = Some(parent);
            }
            None => {
                trace!(name = %done.name, forms = done.form_count(), "parsed dump unit");
                self.roots.push(done);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Form>, JsonGenError> {
        if self.quote != Quote::None {
            let span = Span {
                start: self.quote_start,
                end: self.text.len(),
            };
            return Err(self.error("unterminated quote", span));
        }
        let end = self.text.len();
        self.flush(end)?;

        if let Some(&start) = self.opens.first() {
            let src = self.source();
            return Err(err_ctx!(
                Parse,
                "unbalanced parentheses: '(' is never closed",
                &src,
                Span { start, end: start + 1 },
                UNBALANCED_HELP
            ));
        }
        Ok(self.roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorType;

    fn atoms(form: &Form) -> Vec<String> {
        form.items
            .iter()
            .filter_map(Node::as_atom)
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn quoted_strings_keep_spaces_and_parens() {
        let form = parse(r#"(constructor_decl "init(one:two:)" "a b")"#).unwrap();
        assert_eq!(form.name, "constructor_decl");
        assert_eq!(atoms(&form), vec![r#""init(one:two:)""#, r#""a b""#]);
    }

    #[test]
    fn attribute_values_are_protected() {
        let form = parse(
            "(var_decl \"d\" type='[String : (Int, Int)]' range=[a.swift:1:1 - line:2:3] let)",
        )
        .unwrap();
        assert_eq!(
            atoms(&form),
            vec![
                "\"d\"",
                "type='[String : (Int, Int)]'",
                "range=[a.swift:1:1 - line:2:3]",
                "let"
            ]
        );
    }

    #[test]
    fn generic_annotation_after_quoted_name() {
        let form = parse("(struct_decl \"Sub2\"<A, B> access=internal)").unwrap();
        assert_eq!(atoms(&form), vec!["\"Sub2\"<A, B>", "access=internal"]);
    }

    #[test]
    fn empty_forms_and_numbers() {
        let form = parse("(a () 12 -3)").unwrap();
        assert_eq!(form.items[0], Node::Form(Form::default()));
        assert_eq!(form.items[1], Node::Atom(Atom::Num(12)));
        assert_eq!(form.items[2], Node::Atom(Atom::Str("-3".into())));
    }

    #[test]
    fn newlines_and_tabs_separate_tokens() {
        let form = parse("(a\n\tb\r\n  c)").unwrap();
        assert_eq!(atoms(&form), vec!["b", "c"]);
    }

    #[test]
    fn single_mode_rejects_unbalanced_input() {
        let err = parse("(source_file (struct_decl \"A\")").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Parse);
        assert!(err.message().contains("never closed"));

        assert!(parse("(a))").is_err());
        assert!(parse("(a) (b)").is_err());
        assert!(parse("junk (a)").is_err());
        assert!(parse("").is_err());
        assert!(parse("(a \"open)").is_err());
    }

    #[test]
    fn multi_mode_splits_units_and_tolerates_dangling_close() {
        let roots = parse_units("(source_file (a)))\n(source_file (b))").unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[1].to_string(), "(source_file (b))");

        assert!(parse_units("  ").unwrap().is_empty());
        assert!(parse_units("(source_file").is_err());
    }
}
