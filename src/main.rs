//! Validates JSON string literals passed to Newtonsoft.Json parse APIs in C# code.
//!
//! Binary crate entry point. All CLI logic is in the `cli` module.

// Use mimalloc as global allocator: many short-lived tree-sitter trees per thread.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod cli;

fn main() {
    cli::run();
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
