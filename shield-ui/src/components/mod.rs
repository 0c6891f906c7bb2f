pub mod charts;
pub mod gauge;
pub mod navbar;
pub mod risk_badge;
