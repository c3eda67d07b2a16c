pub mod controls;
pub mod table;
pub mod title_bar;
