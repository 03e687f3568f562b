pub mod api_message;
pub mod db_message;
pub mod recipient;
