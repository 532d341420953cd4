//! Domain primitives, entities, validation and ports.
//!
//! Everything here is transport agnostic: the HTTP adapter maps these types
//! to JSON bodies and status codes, the persistence adapter maps them to
//! rows. Sessions, repositories and permission checks are always passed
//! explicitly; nothing reads ambient state.

pub mod file;
pub mod opportunity;
pub mod organization;
pub mod permissions;
pub mod ports;
pub mod session;
pub mod user;
pub mod validation;
pub mod validators;

pub use self::session::Session;
pub use self::user::{User, UserType};
pub use self::validation::Validation;
