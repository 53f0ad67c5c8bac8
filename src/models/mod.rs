pub mod availability;
pub mod booking;
pub mod extra;
pub mod room;
pub mod service;

pub use availability::Availability;
pub use booking::{Booking, BookingExtraLine, BookingStatus, LifecycleAction};
pub use extra::ExtraItem;
pub use room::{Room, RoomStatus};
pub use service::{Service, ServiceKind};
