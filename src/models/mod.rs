pub mod booking;
pub mod content;
pub mod customer;
pub mod notification;
pub mod partner;
pub mod promo;
pub mod service;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use content::{
    GalleryImage, NewGalleryImage, NewStudioUpdate, PartnerCondition, StudioUpdate,
    StudioUpdatePatch,
};
pub use customer::Customer;
pub use notification::Notification;
pub use partner::{Partner, PartnerStatus};
pub use promo::{NewPromoCode, PromoCode};
pub use service::{NewService, ServiceItem, ServiceUpdate};
