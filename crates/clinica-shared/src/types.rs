use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Store key of a user record (`users/{uid}`), also the owner segment
    /// of that user's appointments.
    UserId
);
string_id!(
    /// Push key of a single appointment under its owning user.
    AppointmentId
);
string_id!(
    /// Store key of a doctor record (`doctors/{uid}`).
    DoctorId
);
string_id!(
    /// Push key of a point-of-sale transaction (`sales/{saleId}`).
    SaleId
);
string_id!(
    /// Store key of a vendor (`vendors/{vendorId}`).
    VendorId
);
string_id!(
    /// Store key of a product under its vendor.
    ProductId
);
string_id!(BlogId);

/// How an appointment or sale was paid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Online => "Online",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attendance outcome of an appointment.
///
/// The stored field is a plain boolean that may be absent: absent means the
/// outcome has not been recorded yet, `true` means the patient showed up,
/// `false` means they were explicitly marked absent.  The enum keeps the
/// three states distinct instead of round-tripping an `Option<bool>`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Attendance {
    #[default]
    Pending,
    Attended,
    NotAttended,
}

impl Attendance {
    /// The boolean written to the store, if any.  `Pending` is never
    /// written; it is represented by the absence of the field.
    pub fn stored_flag(&self) -> Option<bool> {
        match self {
            Attendance::Pending => None,
            Attendance::Attended => Some(true),
            Attendance::NotAttended => Some(false),
        }
    }

    pub fn from_stored_flag(flag: Option<bool>) -> Self {
        match flag {
            None => Attendance::Pending,
            Some(true) => Attendance::Attended,
            Some(false) => Attendance::NotAttended,
        }
    }
}

/// Role stored on a user record, checked when gating admin operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}
