//! Integration tests for the complete lex -> parse -> emit pipeline.
//!
//! Each test compiles a small class through the public `compile_source`
//! entry point and asserts on the exact emitted VM text, the same way
//! the worked scenarios in the specification are checked.

use jackc::parser::compile_source;

fn compile(src: &str) -> Vec<String> {
    let (text, err) = compile_source("Test.jack", src);
    assert!(err.is_none(), "unexpected compile error: {err:?}");
    text.lines().map(|l| l.to_owned()).collect()
}

#[test]
fn empty_class_produces_no_output() {
    assert!(compile("class Foo { }").is_empty());
}

#[test]
fn static_variables_share_the_static_segment_across_subroutines() {
    let src = "class Counter {
        static int count;
        function void bump() { let count = count + 1; return; }
        function int get() { return count; }
    }";
    let lines = compile(src);
    assert_eq!(
        lines,
        vec![
            "function Counter.bump 0",
            "push static 0",
            "push constant 1",
            "add",
            "pop static 0",
            "push constant 0",
            "return",
            "function Counter.get 0",
            "push static 0",
            "return",
        ]
    );
}

#[test]
fn nested_method_calls_thread_the_receiver_through_each_call() {
    let src = "class Node {
        field int value;
        field Node next;

        method int getValue() { return value; }
        method int getNextValue() { return next.getValue(); }
    }";
    let lines = compile(src);
    assert_eq!(
        lines,
        vec![
            "function Node.getValue 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "return",
            "function Node.getNextValue 0",
            "push argument 0",
            "pop pointer 0",
            "push this 1",
            "call Node.getValue 1",
            "return",
        ]
    );
}

#[test]
fn do_statement_compiles_only_the_subroutine_call_not_a_full_expression() {
    // A prior bug compiled `do` as a full expression; a bare call
    // statement must stop exactly at the call and discard its result.
    let src = "class Foo {
        function void bar() {
            do Foo.baz();
            return;
        }
        function int baz() { return 1; }
    }";
    let lines = compile(src);
    assert_eq!(
        lines,
        vec![
            "function Foo.bar 0",
            "call Foo.baz 0",
            "pop temp 0",
            "push constant 0",
            "return",
            "function Foo.baz 0",
            "push constant 1",
            "return",
        ]
    );
}

#[test]
fn if_without_else_still_emits_both_labels() {
    let src = "class Foo {
        function void bar() {
            if (1 = 1) { return; }
            return;
        }
    }";
    let lines = compile(src);
    assert_eq!(
        lines,
        vec![
            "function Foo.bar 0",
            "push constant 1",
            "push constant 1",
            "eq",
            "not",
            "if-goto Foo_IF_TRUE_0",
            "push constant 0",
            "return",
            "goto Foo_IF_END_0",
            "label Foo_IF_TRUE_0",
            "label Foo_IF_END_0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn sequential_ifs_in_the_same_class_get_distinct_label_indices() {
    let src = "class Foo {
        function void bar() {
            if (1 = 1) { return; }
            if (2 = 2) { return; }
            return;
        }
    }";
    let lines = compile(src);
    let true_labels: Vec<_> = lines
        .iter()
        .filter(|l| l.starts_with("label Foo_IF_TRUE_"))
        .collect();
    assert_eq!(true_labels, vec!["label Foo_IF_TRUE_0", "label Foo_IF_TRUE_1"]);
}

#[test]
fn a_grammar_error_stops_at_the_first_offense_with_its_line_number() {
    let src = "class Foo {
        function void bar( {
            return;
        }
    }";
    let (_text, err) = compile_source("Bad.jack", src);
    let err = err.expect("malformed parameter list should fail to compile");
    let message = err.to_string();
    assert!(message.contains("Bad.jack:2"), "unexpected message: {message}");
}

#[test]
fn a_lexical_error_takes_priority_over_any_later_grammar_error() {
    // The unterminated string breaks lexing before the parser ever
    // gets a chance to notice the missing closing brace.
    let src = "class Foo {
        function void bar() { do Output.printString(\"oops; }
    }";
    let (_text, err) = compile_source("Bad.jack", src);
    let message = err.expect("expected an error").to_string();
    assert!(message.contains("lexical error"), "unexpected message: {message}");
}
