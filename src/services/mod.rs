pub mod log_writer;
pub mod poller;
pub mod revocation;
pub mod worker;
