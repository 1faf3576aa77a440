mod getheader;
mod user_scope;

pub use getheader::*;
pub use user_scope::*;
