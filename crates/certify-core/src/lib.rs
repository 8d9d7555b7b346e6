pub mod catalog;
pub mod config;
pub mod contact;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod paths;
pub mod record;
pub mod schema;
pub mod storage;
pub mod types;
pub mod validation;
pub mod wizard;

pub use error::{CertifyError, Result};
