pub mod appointment;
pub mod pet;
pub mod prescription;
pub mod product;
pub mod user;
pub mod veterinarian;
