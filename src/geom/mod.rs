mod boundary;
mod clip;
mod proj;

pub use boundary::{fetch_area, largest_part};
pub use clip::{Road, clip_roads, is_line};
pub use proj::Projector;
