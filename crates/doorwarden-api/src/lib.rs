// doorwarden-api: wire types and transport clients for the dashboard backend

pub mod dashboard;
pub mod error;
pub mod push;
pub mod snapshot;
pub mod transport;

pub use dashboard::DashboardClient;
pub use error::Error;
pub use push::PushChannel;
pub use snapshot::{Statistics, StatusSnapshot, UptimeInfo};
pub use transport::{TlsMode, TransportConfig};
