pub mod attachment_ref;
pub mod attachment_row;
