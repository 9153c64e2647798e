mod inventory;
mod product;

pub use inventory::*;
pub use product::*;
