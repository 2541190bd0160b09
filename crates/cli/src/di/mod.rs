mod doh;

pub use doh::DohServices;
