/// Collection names in the document store.
pub const BOOKINGS: &str = "bookings";
pub const SERVICES: &str = "services";
pub const PROMO_CODES: &str = "promoCodes";
pub const PARTNERS: &str = "partners";
pub const PARTNER_CONDITIONS: &str = "partnerConditions";
pub const GALLERY: &str = "gallery";
pub const UPDATES: &str = "updates";
pub const NOTIFICATIONS: &str = "notifications";
pub const USERS: &str = "users";
