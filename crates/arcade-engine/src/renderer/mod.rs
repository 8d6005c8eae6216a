pub mod traits;

pub use traits::{DrawSurface, RedrawRequest, Renderable};
