//! Object storage adapters

mod s3;

pub use s3::{DEFAULT_REGION, S3Settings, S3Storage};
pub(crate) use s3::content_type_for;
