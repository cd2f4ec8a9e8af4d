mod action_curve;
mod bezier;
mod entity;
mod loader;
mod model;
mod obj;
mod particles;
mod world;

pub use self::action_curve::*;
pub use self::bezier::*;
pub use self::entity::*;
pub use self::loader::*;
pub use self::model::*;
pub use self::obj::*;
pub use self::particles::*;
pub use self::world::*;
