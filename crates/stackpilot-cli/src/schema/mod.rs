pub mod board_file;
pub mod report;
