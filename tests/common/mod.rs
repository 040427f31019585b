mod test_server;

pub use test_server::{COPY_SCRIPT, TEST_SECRET, TestServer};
