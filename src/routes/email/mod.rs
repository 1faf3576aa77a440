mod inbox;
mod send;

pub use inbox::*;
pub use send::*;
