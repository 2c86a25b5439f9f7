//! Seams between the daily job and the outside world.

pub mod clock;
pub mod mail;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use mail::MailTransport;
pub use store::RecordStore;
