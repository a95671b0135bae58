//! Test generic interface error.

#[dynproxy::interface]
pub trait IBox<T> {
    fn get(&self) -> i32;
}

fn main() {}
