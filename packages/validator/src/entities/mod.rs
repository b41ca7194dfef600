//! Per-fragment extractors.
//!
//! Each `*Xml` type wraps one element, exposes accessors computed on demand
//! and materializes an owned entity with its `to_*` method.

mod affiliation;
mod contributor;
mod reference;
mod table;
mod title;

pub use affiliation::{Affiliation, AffiliationXml, InstitutionId};
pub use contributor::{ContribXml, Contributor, CorporateAuthor, PersonName};
pub use reference::{AuthorGroup, Reference, ReferenceXml};
pub use table::{TableParent, TableParentXml};
pub use title::{Title, TitleXml};
