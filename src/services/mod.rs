//! Business logic: account flows over the user store, token service and mailer.

pub mod accounts;

pub use accounts::{AccountError, AccountService, AccountSettings, CreatedUser};
