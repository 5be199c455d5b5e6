pub mod history;
pub mod portfolio;
pub mod prices;
pub mod setup;
pub mod ui;
