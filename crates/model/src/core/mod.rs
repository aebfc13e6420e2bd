pub mod convert;
pub mod data_type;
pub mod value;
