pub mod bookings;
pub mod catalog;
pub mod customers;
pub mod notifications;
pub mod partners;
pub mod pricing;
