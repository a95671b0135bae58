//! Proxy runtime: instances and the interpreter that runs their bodies.

mod interpreter;
mod object;

pub use object::ProxyObject;
