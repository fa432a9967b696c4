//! Jules sessions API: wire types, retrying transport, and client.

pub mod client;
pub mod transport;
pub mod types;

pub use client::{ActivitySource, JulesClient};
pub use transport::{
    ApiRequest, Credential, HttpBackend, Method, RawResponse, ReqwestBackend, RetryPolicy,
    RetryingTransport,
};
pub use types::{Activity, Originator, Page, ResumeCursor, SessionName};
