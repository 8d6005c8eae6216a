pub mod actor;
pub mod collider;
#[cfg(feature = "persistence")]
pub mod record;
pub mod sprite;
