pub mod categories;
pub mod dashboard;
pub mod pricing;
pub mod sign_in;
pub mod signals;
pub mod supply_map;
