//! Test suites for the category daemon.

mod support;
