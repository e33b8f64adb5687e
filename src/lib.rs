mod api;
mod app;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
mod store;
mod utils;

pub use api::Mode;
pub use app::{App, FetchTicket};
pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use store::NewTransaction;
