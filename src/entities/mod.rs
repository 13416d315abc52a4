pub mod sync_log;
