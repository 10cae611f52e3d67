pub mod debug;
pub mod errors;
pub mod movement;

pub use debug::*;
pub use errors::*;
pub use movement::*;
