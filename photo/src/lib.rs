pub mod context;
pub mod errors;
mod loader;
pub mod notification;
pub mod photo;
pub mod ui_context;

pub use context::PhotoContext;
pub use notification::{NotificationCenter, PhotoEvent, PhotoNotification};
pub use photo::{Photo, PhotoBuilder, PhotoSource};
pub use ui_context::{UiContext, UiLoop};
