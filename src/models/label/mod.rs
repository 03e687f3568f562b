pub mod label_row;
