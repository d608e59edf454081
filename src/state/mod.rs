pub mod app;
pub mod message;

pub use app::AppState;
pub use message::{Message, ReceiveClock, Record, Store};
