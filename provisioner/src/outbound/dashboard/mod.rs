//! Dashboard outbound adapter.
//!
//! A thin HTTP implementation of the `DashboardApi` port.

mod dto;
mod http_client;

pub use http_client::{DashboardHttpClient, Surface};
