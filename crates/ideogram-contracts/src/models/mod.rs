mod catalog;
mod params;

pub use catalog::{ModelFamily, ModelId};
pub use params::{excluded_params, supports_param, RequestParam};
