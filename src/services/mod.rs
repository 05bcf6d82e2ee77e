pub mod dispatch;
pub mod sms;

pub use dispatch::SmsService;
