//! Test reference return type error.

#[dynproxy::interface]
pub trait INamed {
    fn name(&self) -> &str;
}

fn main() {}
