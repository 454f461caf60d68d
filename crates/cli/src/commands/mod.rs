//! Command handlers for the council CLI.

pub mod ask;
pub mod context;
pub mod search;

pub use ask::AskCommand;
pub use search::SearchCommand;
