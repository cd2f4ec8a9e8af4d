mod assets;
mod benchmark;
mod completion;
mod error;
mod launcher;
mod math;
mod render;
mod scene;
mod screen;
mod value;
mod view;
mod window;

pub use self::assets::*;
pub use self::benchmark::*;
pub use self::completion::*;
pub use self::error::*;
pub use self::launcher::*;
pub use self::math::*;
pub use self::render::*;
pub use self::scene::*;
pub use self::screen::*;
pub use self::value::*;
pub use self::view::*;
pub use self::window::*;
