pub(crate) mod compositor;
pub(crate) mod shadow;
pub(crate) mod shapes;
pub(crate) mod surface;
pub(crate) mod text;
