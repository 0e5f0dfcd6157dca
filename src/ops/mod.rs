pub mod cell_ops;
pub mod editor;
pub mod export;
pub mod import;
pub mod navigation;
pub mod workspace;
