use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn as_i64(&self) -> i64 {
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

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_type!(
    /// A family identifier (database BIGSERIAL).
    FamilyId
);

id_type!(
    /// A family member identifier (database BIGSERIAL).
    MemberId
);

id_type!(
    /// A task identifier (database BIGSERIAL).
    TaskId
);

id_type!(
    /// A recurring task template identifier (database BIGSERIAL).
    TaskTemplateId
);

id_type!(
    /// A schedule template identifier (database BIGSERIAL).
    TemplateId
);

id_type!(
    /// A schedule block identifier (database BIGSERIAL).
    BlockId
);

id_type!(
    /// A star ledger entry identifier (database BIGSERIAL).
    LedgerEntryId
);
