//! Test utilities for auth module.
