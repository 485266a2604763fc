use crate::ids::{PrimitiveIndex, SubRootIndex};

/// Errors raised while turning one element into draw-call input.
///
/// These never abort a root: arbitration logs them and skips the element.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchError {
    /// The element's bounds were NaN or infinite after transformation.
    NonFiniteBounds { primitive: PrimitiveIndex },
    /// The primitive names a sub-root the root does not have.
    MissingSubRoot {
        primitive: PrimitiveIndex,
        sub_root: SubRootIndex,
    },
    /// An index referenced a primitive that is not in the table.
    MissingPrimitive(PrimitiveIndex),
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::NonFiniteBounds { primitive } => {
                write!(f, "Primitive {} produced non-finite bounds", primitive.0)
            }
            BatchError::MissingSubRoot {
                primitive,
                sub_root,
            } => write!(
                f,
                "Primitive {} references missing sub-root {}",
                primitive.0, sub_root.0
            ),
            BatchError::MissingPrimitive(primitive) => {
                write!(f, "Primitive {} not found", primitive.0)
            }
        }
    }
}

impl std::error::Error for BatchError {}

/// Result type for batching operations.
pub type BatchResult<T> = Result<T, BatchError>;
