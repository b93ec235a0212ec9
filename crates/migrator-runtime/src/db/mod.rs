mod pool;

pub use pool::{connect_options, Database};
