pub mod device_client;
pub mod endpoint;

pub use device_client::{DeviceClient, DEFAULT_TIMEOUT};
pub use endpoint::{Endpoint, DEFAULT_PORT};
