/// Frame sinks.
pub mod sink;
