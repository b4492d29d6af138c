mod holidays;
mod leave;
mod store;
mod team;

pub use holidays::*;
pub use leave::*;
pub use store::*;
pub use team::*;
