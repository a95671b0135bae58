//! Test non-method trait item error.

#[dynproxy::interface]
pub trait ISized {
    const SIZE: i32;
    fn size(&self) -> i32;
}

fn main() {}
