//! Unit test suite for lessonforge
//!
//! Property tests for the template engine's parse and evaluation invariants.
//!
//! ```bash
//! cargo test --test unit
//! PROPTEST_CASES=2000 cargo test --test unit
//! ```
