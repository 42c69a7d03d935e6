//! Tower middleware for the contents server.

pub mod request_id;
