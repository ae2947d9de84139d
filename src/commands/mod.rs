//! Commands Layer
//!
//! Permission-checked operations that bridge the CLI to the repositories.
//! Every command takes the acting participant explicitly.

mod permissions;
mod jar_cmd;
mod member_cmd;
mod idea_cmd;
mod pool_cmd;


pub use permissions::require_role;
pub use jar_cmd::*;
pub use member_cmd::*;
pub use idea_cmd::*;
pub use pool_cmd::*;
