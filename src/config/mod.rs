mod model;
mod persistence;

pub(crate) use model::BakeConfig;
pub(crate) use persistence::load_config;
