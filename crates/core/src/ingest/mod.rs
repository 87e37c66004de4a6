pub mod demo;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod profile;
pub mod resolver;
pub mod source;
