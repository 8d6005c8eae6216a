pub mod physics;
pub mod polygon;
pub mod scene;
pub mod scheduler;
pub mod time;
pub mod vector;
