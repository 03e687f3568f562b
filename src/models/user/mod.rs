pub mod user_row;
