pub mod kinds;
pub mod review;
