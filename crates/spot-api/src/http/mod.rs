//! HTTP implementation of [`SpotApi`](crate::SpotApi).

mod client;
mod models;

pub use client::SpotClient;
pub use models::ItemList;
