// Library target shares the question engine with the binary, integration tests
// and criterion benchmarks. Terminal code (app, event loop, widgets) lives only
// in the binary.
pub mod config;
pub mod corpus;
pub mod engine;
pub mod session;
pub mod store;
