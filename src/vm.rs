//! The stack-VM instruction set this compiler emits, and a writer that
//! formats instructions into line-oriented text.

use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arithmetic {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl Display for Arithmetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Arithmetic::Add => "add",
            Arithmetic::Sub => "sub",
            Arithmetic::Neg => "neg",
            Arithmetic::Eq => "eq",
            Arithmetic::Gt => "gt",
            Arithmetic::Lt => "lt",
            Arithmetic::And => "and",
            Arithmetic::Or => "or",
            Arithmetic::Not => "not",
        };
        f.write_str(name)
    }
}

/// Accumulates emitted VM instructions as text lines.
///
/// Mirrors the shape of a conventional VM writer (`push`/`pop`/arithmetic/
/// flow/call/function/return), except it buffers into memory rather than
/// writing straight to a file handle: the driver decides where the
/// finished text goes, the writer only knows how to format it.
#[derive(Debug, Default)]
pub struct VmWriter {
    lines: Vec<String>,
}

impl VmWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_push(&mut self, segment: Segment, index: usize) {
        self.lines.push(format!("push {segment} {index}"));
    }

    pub fn write_pop(&mut self, segment: Segment, index: usize) {
        self.lines.push(format!("pop {segment} {index}"));
    }

    pub fn write_arithmetic(&mut self, op: Arithmetic) {
        self.lines.push(op.to_string());
    }

    pub fn write_label(&mut self, label: &str) {
        self.lines.push(format!("label {label}"));
    }

    pub fn write_goto(&mut self, label: &str) {
        self.lines.push(format!("goto {label}"));
    }

    pub fn write_if(&mut self, label: &str) {
        self.lines.push(format!("if-goto {label}"));
    }

    pub fn write_call(&mut self, name: &str, n_args: usize) {
        self.lines.push(format!("call {name} {n_args}"));
    }

    pub fn write_function(&mut self, name: &str, n_locals: usize) {
        self.lines.push(format!("function {name} {n_locals}"));
    }

    pub fn write_return(&mut self) {
        self.lines.push("return".to_owned());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Renders the buffered instructions as the final `.vm` file text,
    /// one instruction per line, newline-terminated.
    pub fn into_text(self) -> String {
        let mut text = self.lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_push_and_pop_with_lowercase_segments() {
        let mut w = VmWriter::new();
        w.write_push(Segment::Constant, 42);
        w.write_pop(Segment::This, 0);
        assert_eq!(w.lines(), &["push constant 42", "pop this 0"]);
    }

    #[test]
    fn formats_call_and_function() {
        let mut w = VmWriter::new();
        w.write_function("Foo.bar", 2);
        w.write_call("Math.multiply", 2);
        w.write_return();
        assert_eq!(
            w.lines(),
            &["function Foo.bar 2", "call Math.multiply 2", "return"]
        );
    }

    #[test]
    fn into_text_joins_with_trailing_newline() {
        let mut w = VmWriter::new();
        w.write_push(Segment::Constant, 1);
        w.write_return();
        assert_eq!(w.into_text(), "push constant 1\nreturn\n");
    }
}
