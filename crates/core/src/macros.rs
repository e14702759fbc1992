// Every wire enum shares the same shape: a fixed variant list, a snake_case wire
// name, and a lenient `FromStr` for user input.
macro_rules! define_wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::CoreError;

            fn from_str(raw: &str) -> $crate::error::CoreResult<Self> {
                let needle = raw.trim().replace('-', "_");
                $name::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(&needle))
                    .ok_or_else(|| {
                        $crate::error::UnknownVariantSnafu {
                            stage: "parse-wire-enum",
                            kind: $kind,
                            raw: raw.to_string(),
                        }
                        .build()
                    })
            }
        }
    };
}
