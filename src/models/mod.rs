pub mod contest;
pub mod problem;
pub mod room;
pub mod solution;
pub mod user;

pub use contest::*;
pub use problem::*;
pub use room::*;
pub use solution::*;
pub use user::*;
