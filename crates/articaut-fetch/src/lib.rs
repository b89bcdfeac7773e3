//! SSRF-guarded HTTP transport and session cache (SPEC_FULL.md §4.B-D):
//! a pool of fingerprinted `reqwest` clients keyed by `(preset, proxy)`,
//! a pure content validator, and the `HttpTransport` port implementation
//! consumed abstractly by `articaut-extraction` and `articaut-spider`.

pub mod session;
pub mod transport;
pub mod validator;

pub use session::{SessionCache, SessionEntry, SessionKey};
pub use transport::ReqwestTransport;
pub use validator::{validate, ValidatedContent};
