pub mod entry;
pub mod folder;
