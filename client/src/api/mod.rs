//! Typed wrappers per backend resource.
//!
//! Each wrapper borrows the [`ApiClient`] and is obtained through an accessor
//! (`client.messages()`, `client.finance()`, ...). Paths match the backend
//! controllers exactly.

mod admin;
mod applications;
mod auth;
mod bookings;
mod dashboard;
mod finance;
mod messages;
mod notifications;
mod properties;
mod roommates;
mod users;
mod verification;

pub use admin::{AdminApi, AuditLogQuery};
pub use applications::ApplicationsApi;
pub use auth::AuthApi;
pub use bookings::BookingsApi;
pub use dashboard::DashboardApi;
pub use finance::{DateRange, FinanceApi};
pub use messages::{DEFAULT_MESSAGE_PAGE, MessagesApi};
pub use notifications::NotificationsApi;
pub use properties::PropertiesApi;
pub use roommates::RoommatesApi;
pub use users::{MIN_SEARCH_CHARS, UsersApi};
pub use verification::VerificationApi;

use crate::ApiClient;

macro_rules! accessors {
    ($($(#[$doc:meta])* $name:ident => $api:ident;)*) => {
        impl ApiClient {
            $(
                $(#[$doc])*
                #[must_use]
                pub fn $name(&self) -> $api<'_> {
                    $api::new(self)
                }
            )*
        }
    };
}

accessors! {
    /// `/api/auth/*`
    auth => AuthApi;
    /// `/api/users/*`
    users => UsersApi;
    /// `/api/messages/*`
    messages => MessagesApi;
    /// `/api/notifications/*`
    notifications => NotificationsApi;
    /// `/api/properties/*` and `/api/amenities`
    properties => PropertiesApi;
    /// `/api/bookings/*`
    bookings => BookingsApi;
    /// `/api/finance/*`
    finance => FinanceApi;
    /// `/api/dashboard/*`
    dashboard => DashboardApi;
    /// `/api/admin/*`
    admin => AdminApi;
    /// `/api/roommates/*`
    roommates => RoommatesApi;
    /// `/api/applications/*`
    applications => ApplicationsApi;
    /// `/api/verification/*`
    verification => VerificationApi;
}
