//! CMS access split into the raw HTTP client, the validated record models,
//! and the repository layer the rest of the service goes through.

pub mod client;
pub mod models;
pub mod repository;

pub use client::{CmsBackend, CmsObjectList, CmsQuery, CmsService, NewCmsObject};
pub use models::{CmsObject, ShowKind, ShowMetadata, ShowRecord};
pub use repository::ShowRepository;
