//! Statement builders. Each one compiles to a [`Query`] and runs through the
//! execution pipeline against any [`Session`](crate::session::Session).

mod delete;
mod insert;
mod raw;
mod select;
mod update;

pub use delete::Deleter;
pub use insert::{Inserter, UpsertBuilder};
pub use raw::RawQuerier;
pub use select::Selector;
pub use update::Updater;

use crate::error::Result;
use crate::value::Value;

/// Compiled statement: SQL text with positional `?` placeholders, and the
/// arguments bound to them in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub args: Vec<Value>,
}

/// Anything that compiles to a [`Query`].
pub trait QueryBuilder: Send + Sync {
    fn build(&self) -> Result<Query>;
}
