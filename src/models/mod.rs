pub mod channel;
pub mod message;
pub mod response;
pub mod team;
pub mod user;

pub use channel::*;
pub use message::*;
pub use response::*;
pub use team::*;
pub use user::*;
