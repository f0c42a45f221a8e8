//! Integration tests with stub transports and a mock HTTP server

pub mod mock_server;
pub mod processing;
