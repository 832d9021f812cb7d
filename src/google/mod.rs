//! Google service account credentials and the Calendar API client.

mod credentials;
mod gcal;

pub use credentials::{
    CredentialError, CredentialProvider, DEFAULT_TOKEN_URI, FileCredentialProvider,
    ServiceAccountKey,
};
pub use gcal::GoogleCalendar;
