pub mod laterality;
pub mod projection;
pub mod spacing;
pub mod tags;
pub mod view_position;

pub use laterality::extract_laterality;
pub use projection::extract_projection;
pub use spacing::extract_pixel_spacing;
pub use tags::*;
pub use view_position::{extract_view_position, parse_view_position};
