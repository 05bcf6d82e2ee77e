pub mod sms;
pub mod task;

pub use sms::SendRequest;
pub use task::{TaskRecord, TaskStatus};
