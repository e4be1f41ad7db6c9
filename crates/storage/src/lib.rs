pub mod db;

pub use db::{create_db, insert_processing_log, insert_transaction, save_processing_result, DbPool};
