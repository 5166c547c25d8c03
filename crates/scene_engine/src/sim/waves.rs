//! Finite-difference wave-height field
//!
//! Simulates a damped 2D wave equation over a regular grid. Each tick applies
//! an explicit leapfrog update to the interior cells from the two previous
//! height states, then rebuilds vertex normals by central differences.
//! Boundary cells stay at rest so no update ever reads outside the grid.

use crate::foundation::math::Vec3;
use crate::sim::SimError;

/// Grid-based wave-height simulator with a disturbance API
pub struct WaveField {
    rows: usize,
    cols: usize,
    spatial_step: f32,
    time_step: f32,

    // Finite-difference coefficients derived from damping/speed/timestep
    k1: f32,
    k2: f32,
    k3: f32,

    // Two height states drive the leapfrog update; buffers swap each tick
    prev: Vec<Vec3>,
    curr: Vec<Vec3>,
    normals: Vec<Vec3>,

    accumulated: f32,
}

impl WaveField {
    /// Create a flat wave field.
    ///
    /// `spatial_step` is the distance between adjacent vertices, `time_step`
    /// the fixed simulation tick. Fails if the grid is smaller than 2x2 or
    /// either step is non-positive.
    pub fn new(
        rows: usize,
        cols: usize,
        spatial_step: f32,
        time_step: f32,
        speed: f32,
        damping: f32,
    ) -> Result<Self, SimError> {
        if rows < 2 || cols < 2 {
            return Err(SimError::InvalidParameters(format!(
                "grid must be at least 2x2, got {rows}x{cols}"
            )));
        }
        if time_step <= 0.0 {
            return Err(SimError::InvalidParameters(format!(
                "time step must be positive, got {time_step}"
            )));
        }
        if spatial_step <= 0.0 {
            return Err(SimError::InvalidParameters(format!(
                "spatial step must be positive, got {spatial_step}"
            )));
        }

        let d = damping * time_step + 2.0;
        let e = (speed * speed) * (time_step * time_step) / (spatial_step * spatial_step);
        let k1 = (damping * time_step - 2.0) / d;
        let k2 = (4.0 - 8.0 * e) / d;
        let k3 = (2.0 * e) / d;

        let width = (cols - 1) as f32 * spatial_step;
        let depth = (rows - 1) as f32 * spatial_step;
        let half_width = 0.5 * width;
        let half_depth = 0.5 * depth;

        let mut curr = Vec::with_capacity(rows * cols);
        let mut normals = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            let z = half_depth - i as f32 * spatial_step;
            for j in 0..cols {
                let x = -half_width + j as f32 * spatial_step;
                curr.push(Vec3::new(x, 0.0, z));
                normals.push(Vec3::new(0.0, 1.0, 0.0));
            }
        }

        Ok(Self {
            rows,
            cols,
            spatial_step,
            time_step,
            k1,
            k2,
            k3,
            prev: curr.clone(),
            curr,
            normals,
            accumulated: 0.0,
        })
    }

    /// Number of grid vertices
    pub fn vertex_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of triangles in the grid's triangulation
    pub fn triangle_count(&self) -> usize {
        (self.rows - 1) * (self.cols - 1) * 2
    }

    /// Grid row count
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Grid column count
    pub fn column_count(&self) -> usize {
        self.cols
    }

    /// Spatial extent along x
    pub fn width(&self) -> f32 {
        (self.cols - 1) as f32 * self.spatial_step
    }

    /// Spatial extent along z
    pub fn depth(&self) -> f32 {
        (self.rows - 1) as f32 * self.spatial_step
    }

    /// Vertex position by linear index
    pub fn position(&self, i: usize) -> Vec3 {
        self.curr[i]
    }

    /// Vertex normal by linear index
    pub fn normal(&self, i: usize) -> Vec3 {
        self.normals[i]
    }

    /// Advance the simulation by `dt` seconds of real time.
    ///
    /// Integration runs at the fixed tick configured at construction; elapsed
    /// time accumulates until whole ticks can be consumed, so the update rate
    /// is independent of frame rate.
    pub fn update(&mut self, dt: f32) {
        self.accumulated += dt;
        while self.accumulated >= self.time_step {
            self.step();
            self.accumulated -= self.time_step;
        }
    }

    /// Add an impulse at the given cell and a half-strength impulse to its
    /// four direct neighbors, seeding a smooth outward ripple.
    ///
    /// # Panics
    /// The target must be an interior cell; disturbing at or beyond the grid
    /// edge is a caller bug and fails fast rather than clamping.
    pub fn disturb(&mut self, row: usize, col: usize, magnitude: f32) {
        assert!(
            row >= 1 && row < self.rows - 1,
            "disturbance row {row} outside interior [1, {})",
            self.rows - 1
        );
        assert!(
            col >= 1 && col < self.cols - 1,
            "disturbance col {col} outside interior [1, {})",
            self.cols - 1
        );

        let half = 0.5 * magnitude;
        let n = self.cols;
        self.curr[row * n + col].y += magnitude;
        self.curr[row * n + col + 1].y += half;
        self.curr[row * n + col - 1].y += half;
        self.curr[(row + 1) * n + col].y += half;
        self.curr[(row - 1) * n + col].y += half;
    }

    /// One fixed-timestep update of the interior cells, then a normal rebuild.
    fn step(&mut self) {
        let n = self.cols;

        // The update overwrites the oldest state in place; the swap below
        // makes it the current one.
        for i in 1..self.rows - 1 {
            for j in 1..self.cols - 1 {
                self.prev[i * n + j].y = self.k1 * self.prev[i * n + j].y
                    + self.k2 * self.curr[i * n + j].y
                    + self.k3
                        * (self.curr[(i + 1) * n + j].y
                            + self.curr[(i - 1) * n + j].y
                            + self.curr[i * n + j + 1].y
                            + self.curr[i * n + j - 1].y);
            }
        }
        std::mem::swap(&mut self.prev, &mut self.curr);

        for i in 1..self.rows - 1 {
            for j in 1..self.cols - 1 {
                let left = self.curr[i * n + j - 1].y;
                let right = self.curr[i * n + j + 1].y;
                let top = self.curr[(i - 1) * n + j].y;
                let bottom = self.curr[(i + 1) * n + j].y;
                let normal = Vec3::new(left - right, 2.0 * self.spatial_step, bottom - top);
                self.normals[i * n + j] = normal.normalize();
            }
        }
    }
}
