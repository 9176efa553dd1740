//! Shared test utilities for ocr-batch integration tests.
//!
//! - `TestHarness`: temp input/output roots plus a file-backed database
//! - `ScriptedEngine` / `FakeRenderer`: substitutes for the real engines

pub mod fakes;
pub mod harness;

pub use fakes::{FakeRenderer, Script, ScriptedEngine};
pub use harness::TestHarness;
