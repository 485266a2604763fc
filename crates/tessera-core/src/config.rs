/// Tuning knobs for classification, arbitration and camera sorting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchingConfig {
    /// Maximum `1 - |n·n_ref|` for two plane normals to count as parallel.
    pub coplanar_normal_tolerance: f32,
    /// Maximum distance of a sub-root origin from a reference plane, in world units.
    pub coplanar_distance_tolerance: f32,
    /// Maximum `1 - |q·q_ref|` for two rotations to be grouped together.
    pub rotation_tolerance: f32,
    /// Fractional step used when nudging transparent sets and draw calls toward the camera.
    pub depth_adjustment_ratio: f32,
    /// Relative tolerance for treating two quads as exactly coplanar during sorting.
    pub coplanar_sort_epsilon: f32,
    /// Process dirty roots on the task pool when more than one is dirty.
    pub parallel_arbitration: bool,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        BatchingConfig {
            coplanar_normal_tolerance: 1e-4,
            coplanar_distance_tolerance: 1e-3,
            rotation_tolerance: 1e-5,
            depth_adjustment_ratio: 1e-4,
            coplanar_sort_epsilon: 1e-4,
            parallel_arbitration: true,
        }
    }
}

impl BatchingConfig {
    /// Set both plane-matching tolerances.
    pub fn with_coplanar_tolerance(mut self, normal: f32, distance: f32) -> Self {
        self.coplanar_normal_tolerance = normal;
        self.coplanar_distance_tolerance = distance;
        self
    }

    /// Set the rotation-matching tolerance.
    pub fn with_rotation_tolerance(mut self, tolerance: f32) -> Self {
        self.rotation_tolerance = tolerance;
        self
    }

    /// Set the fraction of distance used per depth nudge.
    pub fn with_depth_adjustment_ratio(mut self, ratio: f32) -> Self {
        self.depth_adjustment_ratio = ratio;
        self
    }

    /// Enable or disable rebuilding dirty roots on the task pool.
    pub fn with_parallel_arbitration(mut self, enabled: bool) -> Self {
        self.parallel_arbitration = enabled;
        self
    }
}
