pub mod admin_query;
pub mod notifier;

pub use admin_query::{shape, AdminQueryService, Listing, QuerySettings};
pub use notifier::{notify_best_effort, LogNotifier, Notifier, NotifyError, StatusChangeEvent};
