//! Request execution, response wrapping and the transport seam.

pub mod request;
pub mod response;
pub mod transport;

pub use request::{Body, Request};
pub use response::Response;
pub use transport::{default_transport, RawResponse, ReqwestTransport, Transport, TransportHandle};
