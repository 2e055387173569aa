pub mod category_chart;
pub mod controls;
pub mod debug;
pub mod header;
pub mod product_table;
pub mod text_input;
