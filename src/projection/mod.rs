pub(crate) mod direction;
pub(crate) mod face;
pub(crate) mod ring;
pub(crate) mod sample;
pub(crate) mod uv;
