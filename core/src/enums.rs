//! Fixed string sets used by request parameters and response models.
//!
//! Every enum is generated by `api_enum!`, which adds an `Other(String)`
//! variant so values introduced by the server after this crate was built
//! still deserialize.

/// Declare a string-backed enum with a catch-all `Other` variant.
macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value this version of the crate does not know about.
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $wire, )+
                    $name::Other(value) => value.as_str(),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s {
                    $( $wire => $name::$variant, )+
                    other => $name::Other(other.to_string()),
                })
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Ok(match value.as_str() {
                    $( $wire => $name::$variant, )+
                    _ => $name::Other(value),
                })
            }
        }
    };
}

pub(crate) use api_enum;

api_enum! {
    /// Sort direction shared by list endpoints that accept `sort`.
    pub enum SortOrder {
        CreatedAtAsc => "created_at",
        CreatedAtDesc => "-created_at",
        UpdatedAtAsc => "updated_at",
        UpdatedAtDesc => "-updated_at",
    }
}
