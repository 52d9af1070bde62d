//! ASCII binary encoding: every byte becomes eight `0`/`1` characters.
//!
//! [`binary`] holds the codec and its command-line surface, [`common`] the
//! input, signal and logging plumbing shared with the `fbinec` binary.

/// Use mimalloc as the global allocator for all binaries.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod binary;
pub mod common;
