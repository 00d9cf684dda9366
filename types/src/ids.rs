use std::fmt;

macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

backend_id!(
    /// Primary key of a user account.
    UserId
);
backend_id!(ConversationId);
backend_id!(MessageId);
backend_id!(NotificationId);
backend_id!(PropertyId);
backend_id!(BookingId);
backend_id!(PayoutRequestId);
backend_id!(PayoutMethodId);
backend_id!(AmenityId);
backend_id!(ReportId);
backend_id!(VerificationId);
backend_id!(RoommatePostId);
backend_id!(ApplicationId);
