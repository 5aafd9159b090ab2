pub mod browser;
pub mod connection;
pub mod popup;

pub use connection::{ConnectionForm, FocusField};
