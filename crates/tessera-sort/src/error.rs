use tessera_batch::CameraId;

/// Errors that abort one camera's sort pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SortError {
    /// The camera's transform or projection cannot produce finite, invertible matrices.
    InvalidCamera {
        camera: CameraId,
        reason: &'static str,
    },
}

impl std::fmt::Display for SortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortError::InvalidCamera { camera, reason } => {
                write!(f, "Camera {} is invalid: {}", camera.0, reason)
            }
        }
    }
}

impl std::error::Error for SortError {}

pub type SortResult<T> = Result<T, SortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SortError::InvalidCamera {
            camera: CameraId(3),
            reason: "zero-length view direction",
        };
        assert_eq!(
            err.to_string(),
            "Camera 3 is invalid: zero-length view direction"
        );
    }
}
