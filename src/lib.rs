// Library target shared by the binary, the scenario tests and the criterion
// benchmarks. The terminal front end (app, event, ui) lives in the binary.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod session;
pub mod store;
