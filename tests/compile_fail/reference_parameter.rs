//! Test by-reference parameter error.

#[dynproxy::interface]
pub trait ILogger {
    fn log(&self, line: &str);
}

fn main() {}
