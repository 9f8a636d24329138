use serde::{Deserialize, Serialize};

/// Declares a dense integer handle into one of the model's tables.
macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Position of the referenced entry in its table.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                Self(value as u32)
            }
        }
    };
}

handle!(
    /// Index of a declared object type.
    TypeId
);
handle!(
    /// Index of a declared object.
    ObjectId
);
handle!(
    /// Index of a declared fluent.
    FluentId
);
handle!(
    /// Index of an action schema in declaration order.
    SchemaId
);
handle!(
    /// Index of an interned ground fluent, the atomic state variable.
    AtomId
);
