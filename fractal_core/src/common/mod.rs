pub mod enums;
pub mod error;
pub mod price;
