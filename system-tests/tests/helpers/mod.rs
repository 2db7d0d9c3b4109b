// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helper modules for system-test binaries.
// Purpose: Keep test-harness plumbing out of the scenario test bodies.
// Dependencies: std
// ============================================================================

#![allow(dead_code, reason = "not every helper is used by every test binary")]

pub mod harness;
