#![doc = "Road network maps of the Mexican states from OpenStreetMap data"]
mod common;

pub mod classify;
pub mod config;
pub mod geom;
pub mod pipeline;
pub mod render;
pub mod source;

#[doc(inline)]
pub use common::{map_file_name, safe_name};

#[doc(inline)]
pub use config::{PipelineConfig, RenderConfig, ServiceConfig, StateOverride, StateRecord};

#[doc(inline)]
pub use pipeline::{StateOutcome, run};
