//! Test method without a receiver error.

#[dynproxy::interface]
pub trait IFactory {
    fn make(seed: i32) -> i32;
}

fn main() {}
