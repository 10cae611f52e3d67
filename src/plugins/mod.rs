pub mod navigation;
pub mod scene;
pub mod visibility;

pub use navigation::*;
pub use scene::*;
pub use visibility::*;
