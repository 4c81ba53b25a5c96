pub mod commands;
pub mod coordinator;
pub mod iam;
pub mod model;
pub mod output;
pub mod polling;
pub mod registers;
pub mod snapshot;
pub mod transport;
pub mod value;
