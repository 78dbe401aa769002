pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod pages;
pub mod scanner;
pub mod workbook;
