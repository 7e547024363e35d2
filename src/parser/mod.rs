//! SQLite CREATE TABLE parsing

mod column_parser;
mod grammar;
mod identifier_utils;
mod table_parser;
mod token_parser_base;

pub use table_parser::{parse_table, parse_tables};
