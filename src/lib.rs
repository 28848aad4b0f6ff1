pub mod api;
pub mod cli;
pub mod db;
pub mod export;
pub mod ordering;
pub mod runner;
pub mod tracker;
