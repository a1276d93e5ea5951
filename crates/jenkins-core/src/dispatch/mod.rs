pub mod layout;
pub mod pump;
pub mod traits;
pub mod types;

pub use layout::LayoutStrategy;
pub use pump::EventPump;
pub use traits::{NotificationDispatcher, StatusWidget, ViewModelProjector};
pub use types::{BuildFailure, NotificationAnchor, format_failure_message};
