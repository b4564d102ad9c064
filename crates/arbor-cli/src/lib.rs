//! Library wrapper around the `arbor` CLI implementation.
//!
//! The binary (`src/main.rs`) is the real entry point. Compiling it as a
//! module here keeps `cargo test -p arbor-cli --lib` working as a fast
//! typecheck of the CLI code without running the binary test suite.
//!
//! Note: `fn main()` inside `main.rs` is just another function when compiled
//! as a module.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;
