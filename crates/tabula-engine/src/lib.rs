//! Tabula Engine - pure table operations
//!
//! Everything in this crate is synchronous and side-effect free:
//!
//! - [`validate_cell_value`] / [`validate_row_data`] - coerce raw input to typed cells
//! - [`convert_value`] / [`can_convert_value`] - the column type conversion matrix
//! - [`filter_rows`] - AND-combined declarative filters
//! - [`sort_rows`] / [`compare_values`] - type-aware multi-key ordering
//! - [`search_rows`] - case-insensitive substring search
//! - [`toggle_sort`], [`add_sort`], [`set_single_sort`] - sort list helpers

mod conversion;
mod filter;
mod natural;
pub mod parse;
mod search;
mod sort;
mod sort_list;
pub mod temporal;
mod validation;

pub use conversion::*;
pub use filter::*;
pub use natural::natural_cmp;
pub use search::search_rows;
pub use sort::{compare_values, sort_rows};
pub use sort_list::*;
pub use validation::*;
