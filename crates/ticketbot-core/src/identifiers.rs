use serde::{Deserialize, Serialize};

macro_rules! snowflake_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

snowflake_id!(GuildId);
snowflake_id!(CategoryId);

#[cfg(test)]
mod tests {
    use super::{CategoryId, GuildId};

    #[test]
    fn ids_round_trip_through_u64() {
        let guild = GuildId::new(u64::MAX);
        assert_eq!(u64::from(guild), u64::MAX);
        assert_eq!(GuildId::from(u64::MAX), guild);

        let category = CategoryId::new(42);
        assert_eq!(category.get(), 42);
        assert_eq!(category.to_string(), "42");
    }
}
