//! Host glue for running exported functions of small WebAssembly modules on
//! wasmtime.
pub mod console;
pub mod runtime;
pub mod value;

#[cfg(test)]
mod test_util;
