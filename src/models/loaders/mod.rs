pub mod notebook_loader;

pub use notebook_loader::{find_notebooks, load_cells, parse_cells};
