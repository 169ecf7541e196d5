//! Terminal route handlers served behind the middleware chain

pub mod ui;

pub use ui::UiHandler;
