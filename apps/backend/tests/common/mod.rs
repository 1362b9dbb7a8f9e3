#![allow(dead_code)]

// Logging is auto-installed for every test binary that pulls in `common`.
#[ctor::ctor]
fn init_logging() {
    backend_test_support::test_logging::init();
}
