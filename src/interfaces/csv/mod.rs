pub mod command_reader;
pub mod review_writer;
