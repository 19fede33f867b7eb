pub(crate) mod controller;
pub(crate) mod driver;
pub(crate) mod scheduler;
