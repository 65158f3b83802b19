pub(crate) mod gif;
pub(crate) mod pipeline;
pub(crate) mod sink;
