pub mod attendance;
pub mod category;
pub mod event;
pub mod user;
