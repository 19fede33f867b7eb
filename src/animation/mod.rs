pub(crate) mod evaluate;
