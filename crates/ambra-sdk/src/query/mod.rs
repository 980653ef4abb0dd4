//! Executable request objects.
//!
//! Capabilities layer up: [`ObjectQuery`] returns one object,
//! [`FieldQuery`] projects one field of it, [`FilterQuery`] adds
//! filter/sort/field criteria (still projecting a result field when the
//! spec names one) and [`PaginatedQuery`] adds lazy paging.

mod filter;
mod object;
mod paginated;

pub use filter::{Filter, FilterCondition, SortOrder, Sorter};
pub use object::{FieldQuery, FilterQuery, ObjectQuery};
pub use paginated::{Page, PaginatedQuery, Pages};
