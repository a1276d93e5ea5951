pub mod errors;
pub mod remote;
pub mod traits;
pub mod types;

pub use errors::{TransportError, TransportErrorKind};
pub use remote::{PendingFetch, RemoteJobSource};
pub use traits::JobTransport;
pub use types::{RawBuild, RawJob, TransportRequest};
