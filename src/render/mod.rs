pub(crate) mod compositor;
pub(crate) mod onion;
pub(crate) mod ops;
pub(crate) mod rasterize;
