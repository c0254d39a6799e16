mod app;
mod signer;

pub use app::{TestApp, TestRequest, TestResponse};
pub use signer::{TestSigner, TokenBuilder};
