pub mod datastruct;
pub mod sort;
