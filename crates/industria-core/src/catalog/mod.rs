//! Loaders for the embedded game catalog: the UTF-16 recipe manifest in its
//! nested-tuple grammar, and the raw-resource deposit table.

mod grammar;
mod recipes;
mod resources;

pub use recipes::{load_recipes, ProducerKind, Recipe, SourcedInput};
pub use resources::load_resources;
