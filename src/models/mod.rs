pub mod cell;
pub mod loaders;
pub mod notebook;

pub use cell::{Cell, CellType, MergeKind, CHANGED_MARKER};
pub use loaders::{find_notebooks, load_cells, parse_cells};
