pub mod component;
pub mod entity;
pub mod error;
pub mod mask;
pub mod system;
pub mod world;

pub use component::Component;
pub use entity::Entity;
pub use error::{Error, Result};
pub use mask::Mask;
pub use system::System;
pub use world::{Id as WorldId, World};
