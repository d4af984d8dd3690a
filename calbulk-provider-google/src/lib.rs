//! Google Calendar backend for calbulk: the REST transport behind
//! [`calbulk_core::EventsApi`], the stored bearer-token session behind
//! [`calbulk_core::AuthorizationProvider`], and the account lookup used by
//! `calbulk status`.

pub mod api;
pub mod config;
pub mod session;
pub mod userinfo;

pub use api::GoogleCalendarApi;
pub use config::GoogleConfig;
pub use session::{Session, SessionTokenProvider};
pub use userinfo::fetch_account_email;
