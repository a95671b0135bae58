//! Test generic method error.

#[dynproxy::interface]
pub trait IPicker {
    fn pick<T>(&self, index: i32) -> i32;
}

fn main() {}
