pub mod account;
pub mod booking;
pub mod event;
pub mod user;

pub use account::{AuthSession, Credentials, LoginPayload, SignupPayload};
pub use booking::Booking;
pub use event::{
    BookingStatus, Coordinates, Event, EventChanges, EventDetail, EventInfo, EventPayload,
    EventRecord, OwnerInfo, ValidatedEvent,
};
pub use user::User;
