//! Juxta: an indentation-sensitive, expression-oriented language.
//!
//! This crate re-exports [`juxta_lang`]. Enable the `tracing` feature to
//! emit parser traces through the [`tracing`](https://docs.rs/tracing) crate.
#![cfg_attr(all(docsrs, not(doctest)), feature(doc_auto_cfg))]

pub use juxta_lang::*;
