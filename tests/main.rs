// Integration tests are modules of tests/main.rs, mirroring the single-binary
// test layout the crate's `autotests = false` setting expects.

mod scenarios;
