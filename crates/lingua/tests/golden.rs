//! End-to-end "source -> exact stdout" tests.
//!
//! No golden binaries are executed: the ELF emitter's byte layout is fully
//! deterministic (header + per-print syscall stubs + concatenated string
//! data, in that order — see `emit::elf`), so the expected stdout bytes are
//! exactly the tail of the emitted file. Comparing that tail is equivalent
//! to running the binary and capturing its output, without needing a Linux
//! x86-64 host to execute it.

use pretty_assertions::assert_eq;

use lingua::{compile, CollectingSink, Target};

fn compiled(source: &str) -> Vec<u8> {
    let mut sink = CollectingSink::default();
    compile(source, "main.lingua", Target::LinuxX86_64, &mut sink).expect("program should compile").bytes
}

fn assert_prints(source: &str, expected: &str) {
    let bytes = compiled(source);
    let expected = expected.as_bytes();
    assert!(bytes.len() >= expected.len(), "emitted binary is shorter than the expected output");
    let tail = &bytes[bytes.len() - expected.len()..];
    assert_eq!(tail, expected);
}

fn assert_fails_to_compile(source: &str) {
    let mut sink = CollectingSink::default();
    let result = compile(source, "main.lingua", Target::LinuxX86_64, &mut sink);
    assert!(result.is_err(), "expected compilation to fail for: {source}");
}

// --- concrete end-to-end scenarios -----------------------------------------

#[test]
fn scenario_1_print_with_embedded_newline() {
    assert_prints(r#"print("hello\n");"#, "hello\n");
}

#[test]
fn scenario_2_const_and_arithmetic() {
    assert_prints("const x: int = 21; print(x*2);", "42");
}

#[test]
fn scenario_3_default_and_named_arguments() {
    assert_prints("fn add(a: int, b: int = 1) -> int { return a + b; } print(add(b=10, a=5));", "15");
}

#[test]
fn scenario_4_inherited_fields() {
    assert_prints(
        "class P { x: int; y: int } class Q : P { z: int } let q = new Q(1,2,3); print(q.x + q.y + q.z);",
        "6",
    );
}

#[test]
fn scenario_5_stdlib_import() {
    assert_prints(r#"import { to_upper } from "std/string"; print(to_upper("ab"));"#, "AB");
}

#[test]
fn scenario_6_loop_calling_a_function() {
    assert_prints(
        r#"fn f() { print("a"); } for (var i: int = 0; i < 3; i = i + 1) { f(); } print("!");"#,
        "aaa!",
    );
}

// --- round-trips / idempotence ----------------------------------------------

#[test]
fn to_upper_is_idempotent() {
    assert_prints(
        r#"import { to_upper } from "std/string"; print(to_upper(to_upper("MixedCase")) == to_upper("MixedCase"));"#,
        "true",
    );
}

#[test]
fn trim_is_idempotent() {
    assert_prints(r#"import { trim } from "std/string"; print(trim(trim("  padded  ")) == trim("  padded  "));"#, "true");
}

#[test]
fn replace_with_identical_old_and_new_is_a_no_op() {
    assert_prints(r#"import { replace } from "std/string"; print(replace("hello world", "o", "o") == "hello world");"#, "true");
}

#[test]
fn full_slice_equals_the_original_string() {
    assert_prints(
        r#"import { len } from "std/string"; let s: string = "hello"; print(s[0:len(s)] == s);"#,
        "true",
    );
}

#[test]
fn tail_slice_of_n_equals_last_n_characters() {
    assert_prints(
        r#"import { len } from "std/string"; let s: string = "hello"; print(s[-3:] == "llo");"#,
        "true",
    );
}

// --- boundary cases ----------------------------------------------------------

#[test]
fn negative_one_index_is_the_last_character() {
    assert_prints(
        r#"import { len } from "std/string"; let s: string = "hello"; print(s[-1] == s[len(s) - 1]);"#,
        "true",
    );
}

#[test]
fn negative_len_index_is_the_first_character() {
    assert_prints(
        r#"import { len } from "std/string"; let s: string = "hello"; print(s[-5] == s[0]);"#,
        "true",
    );
}

#[test]
fn index_at_length_is_a_fatal_error() {
    assert_fails_to_compile(r#"let s: string = "hello"; print(s[5]);"#);
}

#[test]
fn slice_with_start_past_end_is_empty() {
    assert_prints(r#"let s: string = "hello"; print(s[3:1] == "");"#, "true");
}

#[test]
fn slice_end_past_length_is_clamped() {
    assert_prints(r#"let s: string = "hello"; print(s[0:100] == "hello");"#, "true");
}

#[test]
fn integer_division_by_zero_is_fatal() {
    assert_fails_to_compile("print(1 / 0);");
}

#[test]
fn integer_modulo_by_zero_is_fatal() {
    assert_fails_to_compile("print(1 % 0);");
}

#[test]
fn for_loop_past_the_iteration_cap_is_fatal() {
    assert_fails_to_compile("for (var i: int = 0; i < 10001; i = i + 1) {}");
}

#[test]
fn recursion_past_the_call_depth_cap_is_fatal() {
    assert_fails_to_compile("fn rec(n: int) -> int { if (n <= 0) { return 0; } return rec(n - 1); } print(rec(2000));");
}

#[test]
fn assigning_to_a_const_binding_never_compiles() {
    assert_fails_to_compile("const x: int = 1; x = 2; print(x);");
}

#[test]
fn unbounded_recursion_raises_the_recursion_limit_rather_than_looping_forever() {
    assert_fails_to_compile("fn loop_forever() -> int { return loop_forever(); } print(loop_forever());");
}

#[test]
fn top_level_return_is_fatal() {
    assert_fails_to_compile("return 1;");
}

#[test]
fn top_level_break_is_fatal() {
    assert_fails_to_compile("break;");
}
