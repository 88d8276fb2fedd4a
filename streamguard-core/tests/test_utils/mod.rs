// File: streamguard-core/tests/test_utils/mod.rs

pub mod helpers;
