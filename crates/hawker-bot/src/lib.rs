mod dispatch;
mod event;
pub mod format;

pub use dispatch::Dispatcher;
pub use event::{Button, ChatEvent, Reply};
