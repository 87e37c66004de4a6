pub mod projector;
pub mod surface;
