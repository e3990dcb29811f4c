pub mod atoms;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod ewmh;
pub mod frame;
pub mod hints;
pub mod icccm;
pub mod identity;
pub mod liveness;
pub mod property;
pub mod reconcile;
pub mod transport;
pub mod x11;

pub use errors::{ClientError, Result};
