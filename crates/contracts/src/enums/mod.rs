pub mod output_field;

pub use output_field::{OutputField, OutputFieldSet};
