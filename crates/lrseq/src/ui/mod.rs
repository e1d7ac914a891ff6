pub mod table;
pub mod tracker;
pub mod view;
