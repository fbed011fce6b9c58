//! Pipeline integration tests.
//!
//! These run complete builds against a temporary working directory. External
//! tools are faked by [`common::FixtureRunner`]; filesystem steps are real.

mod common;
mod engine_tests;
mod publish_tests;
