//! Socket shape resolution
//!
//! A vectorized input is bound either to one value or to a list of values.
//! The output of a function node is a list as soon as any participating input
//! is a list; scalars are broadcast against it.

use serde::{Deserialize, Serialize};

/// Whether a socket carries a single value or a list of values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketShape {
    #[default]
    Scalar,
    List,
}

impl SocketShape {
    pub fn from_uses_list(uses_list: bool) -> Self {
        if uses_list {
            SocketShape::List
        } else {
            SocketShape::Scalar
        }
    }

    pub fn is_list(self) -> bool {
        self == SocketShape::List
    }
}

/// Resolve the output shape from one "uses list" flag per input.
///
/// Any list input makes the output a list. An empty flag set resolves to
/// [`SocketShape::Scalar`].
pub fn resolve_shape<I>(flags: I) -> SocketShape
where
    I: IntoIterator<Item = bool>,
{
    SocketShape::from_uses_list(flags.into_iter().any(|uses_list| uses_list))
}

/// Resolve the output shape of a variadic node from its aggregate "has list" flag
pub fn resolve_variadic_shape(has_list: bool) -> SocketShape {
    SocketShape::from_uses_list(has_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_list_flag_gives_list() {
        assert_eq!(resolve_shape([true]), SocketShape::List);
        assert_eq!(resolve_shape([false, true]), SocketShape::List);
        assert_eq!(resolve_shape([true, false, false]), SocketShape::List);
        assert_eq!(resolve_shape([true, true]), SocketShape::List);
    }

    #[test]
    fn test_all_scalar_flags_give_scalar() {
        assert_eq!(resolve_shape([false]), SocketShape::Scalar);
        assert_eq!(resolve_shape([false, false]), SocketShape::Scalar);
        assert_eq!(resolve_shape(vec![false; 8]), SocketShape::Scalar);
    }

    #[test]
    fn test_empty_flags_resolve_to_scalar() {
        assert_eq!(resolve_shape(std::iter::empty()), SocketShape::Scalar);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let flags = [false, true, false];
        assert_eq!(resolve_shape(flags), resolve_shape(flags));
    }

    #[test]
    fn test_exhaustive_small_flag_sets() {
        for bits in 1u32..(1 << 4) {
            for width in 1..=4 {
                let flags: Vec<bool> = (0..width).map(|i| bits & (1 << i) != 0).collect();
                let expected = if flags.contains(&true) {
                    SocketShape::List
                } else {
                    SocketShape::Scalar
                };
                assert_eq!(resolve_shape(flags.iter().copied()), expected, "{:?}", flags);
            }
        }
    }

    #[test]
    fn test_variadic_aggregate_flag() {
        assert_eq!(resolve_variadic_shape(true), SocketShape::List);
        assert_eq!(resolve_variadic_shape(false), SocketShape::Scalar);
    }
}
