//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): transport and HTTP errors

pub mod neterror;

#[cfg(test)]
mod tests;
