pub(crate) mod classify;
