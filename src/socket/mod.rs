//! Socket and connection management.
//!
//! - [`connectjob`]: DNS → TCP → TLS connection flow, resolver injected
//! - [`stream`]: boxed socket abstraction over plain and TLS streams
//! - [`tls`]: TLS configuration with BoringSSL

pub mod connectjob;
pub mod stream;
pub mod tls;
