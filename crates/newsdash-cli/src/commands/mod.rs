pub mod categories;
pub mod feeds;
pub mod import;
pub mod run;
