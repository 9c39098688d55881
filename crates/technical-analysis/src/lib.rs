pub mod indicators;
pub mod interpreter;
pub mod snapshot;


pub use indicators::*;
pub use interpreter::*;
pub use snapshot::*;
