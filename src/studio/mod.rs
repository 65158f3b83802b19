pub(crate) mod commands;
pub(crate) mod hit;
pub(crate) mod history;
pub(crate) mod recorder;
pub(crate) mod session;
