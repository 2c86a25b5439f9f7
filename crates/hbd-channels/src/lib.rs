//! # hbd Channels
//! Outbound delivery channels. Only email for now.

pub mod email;

pub use email::SmtpMailer;
