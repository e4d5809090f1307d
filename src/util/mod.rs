pub mod id_generator;
pub mod io;
pub mod logger;
pub mod memory_usage;
pub mod timer;
