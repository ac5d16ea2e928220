//! Unseen-task tracking and popup presentation.

pub mod center;
pub mod dedup;
pub mod presentation;
pub mod reconciliation;
pub mod seen;
pub mod session_flag;
pub mod toast;

pub use center::{NotificationCenter, UiEvent};
pub use presentation::{CloseReason, PresentationQueue};
pub use reconciliation::ReconciliationStore;
pub use seen::SeenRecord;
pub use session_flag::SessionFlag;
pub use toast::{Toast, ToastQueue};
