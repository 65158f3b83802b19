pub(crate) mod flood_fill;
pub(crate) mod pixel_buffer;
