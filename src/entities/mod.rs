pub mod catalog_product;
pub mod deposit;
pub mod donation;
pub mod inventory_level;
pub mod movement_header;
pub mod movement_line;
