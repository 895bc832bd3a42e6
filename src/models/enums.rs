use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AppointmentStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
    NoShow => "no_show",
});

str_enum!(PetSpecies {
    Dog => "dog",
    Cat => "cat",
    Bird => "bird",
    Rabbit => "rabbit",
    Other => "other",
});

str_enum!(ServiceCategory {
    Grooming => "grooming",
    Checkup => "checkup",
    Vaccination => "vaccination",
    Dental => "dental",
    Boarding => "boarding",
});

impl AppointmentStatus {
    /// Completed, cancelled and no-show appointments never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Status transitions are owned by this backend; callers cannot jump
    /// between arbitrary states (e.g. resurrect a cancelled appointment).
    pub fn can_transition_to(&self, next: &AppointmentStatus) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                Self::Confirmed | Self::Cancelled | Self::NoShow
            ),
            Self::Confirmed => matches!(
                next,
                Self::InProgress | Self::Cancelled | Self::NoShow
            ),
            Self::InProgress => matches!(next, Self::Completed | Self::Cancelled),
            Self::Completed | Self::Cancelled | Self::NoShow => false,
        }
    }
}
