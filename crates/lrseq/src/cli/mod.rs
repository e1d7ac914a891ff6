pub mod app;
pub mod history;
pub mod load;
pub mod variants;
