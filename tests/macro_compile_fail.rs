//! Compile-fail tests for macro error paths.
//!
//! Each case is a trait shape that cannot be proxied; the expected
//! diagnostic sits next to it in a `.stderr` file.

#[test]
fn macro_compile_fail_tests() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/compile_fail/*.rs");
}
