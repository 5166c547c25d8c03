//! Frame resources and the fence-guarded ring
//!
//! The CPU prepares frame N while the GPU may still be consuming frames N-1
//! and N-2. Each ring slot bundles the constant buffers and the dynamic wave
//! vertex buffer for one in-flight frame; a slot is only rewritten once the
//! fence value recorded at its submission has been reported complete. That
//! fence check is the sole CPU/GPU synchronization point in the frame loop.

use bytemuck::{Pod, Zeroable};

use crate::render::constants::{MaterialConstants, ObjectConstants, PassConstants};
use crate::render::mesh::Vertex;
use crate::render::RenderError;

/// Default number of in-flight frames
pub const FRAME_RING_DEPTH: usize = 3;

/// Command-queue fence seam.
///
/// The embedding backend exposes its monotonically increasing fence through
/// this trait; tests substitute mocks to drive the ring deterministically.
pub trait GpuFence {
    /// Highest fence value the GPU has completed
    fn completed_value(&self) -> u64;

    /// Block until the given value completes.
    ///
    /// A wait that cannot resolve (device removal) must return
    /// [`RenderError::DeviceLost`]; the ring treats it as fatal.
    fn wait_for(&self, value: u64) -> Result<(), RenderError>;
}

/// CPU-visible staging buffer with per-element indexed writes.
///
/// Element `i` lives at byte offset `i * element_stride()`, matching the
/// offset arithmetic the draw-submission side uses to bind individual
/// constants out of one allocation.
#[derive(Debug, Clone)]
pub struct UploadBuffer<T: Pod> {
    elements: Vec<T>,
}

impl<T: Pod> UploadBuffer<T> {
    /// Allocate a zero-initialized buffer of `count` elements
    pub fn new(count: usize) -> Self {
        Self {
            elements: vec![T::zeroed(); count],
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Byte stride between consecutive elements
    pub fn element_stride(&self) -> usize {
        std::mem::size_of::<T>()
    }

    /// Write one element.
    ///
    /// # Panics
    /// Writing past the allocated element count is a caller bug.
    pub fn copy_data(&mut self, index: usize, value: &T) {
        assert!(
            index < self.elements.len(),
            "upload index {index} out of range for buffer of {} elements",
            self.elements.len()
        );
        self.elements[index] = *value;
    }

    /// Read one element back (draw submission and tests)
    pub fn element(&self, index: usize) -> &T {
        &self.elements[index]
    }

    /// Raw bytes in GPU upload order
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.elements)
    }
}

/// One ring slot: the per-frame buffer bundle plus its submission fence value
#[derive(Debug)]
pub struct FrameResources {
    /// Object constants, one element per render item
    pub object_cb: UploadBuffer<ObjectConstants>,
    /// Material constants, one element per material
    pub material_cb: UploadBuffer<MaterialConstants>,
    /// Pass constants, a single element
    pub pass_cb: UploadBuffer<PassConstants>,
    /// Dynamic vertex buffer for the simulated wave mesh
    pub waves_vb: UploadBuffer<Vertex>,
    fence_value: u64,
}

impl FrameResources {
    fn new(item_capacity: usize, material_capacity: usize, wave_vertex_count: usize) -> Self {
        Self {
            object_cb: UploadBuffer::new(item_capacity),
            material_cb: UploadBuffer::new(material_capacity),
            pass_cb: UploadBuffer::new(1),
            waves_vb: UploadBuffer::new(wave_vertex_count),
            fence_value: 0,
        }
    }

    /// Fence value recorded at this slot's last submission (0 = never used)
    pub fn fence_value(&self) -> u64 {
        self.fence_value
    }
}

/// Fixed-depth rotating pool of per-frame resources
pub struct FrameResourceRing {
    slots: Vec<FrameResources>,
    current: usize,
}

impl FrameResourceRing {
    /// Allocate a ring. Fails on zero depth or zero capacities so the scene
    /// never half-initializes.
    pub fn new(
        depth: usize,
        item_capacity: usize,
        material_capacity: usize,
        wave_vertex_count: usize,
    ) -> Result<Self, RenderError> {
        if depth == 0 {
            return Err(RenderError::InvalidRing("ring depth must be at least 1".into()));
        }
        if item_capacity == 0 || material_capacity == 0 {
            return Err(RenderError::InvalidRing(format!(
                "zero buffer capacity (items {item_capacity}, materials {material_capacity})"
            )));
        }

        log::debug!(
            "frame ring: {depth} slots, {item_capacity} items, {material_capacity} materials, \
             {wave_vertex_count} wave vertices"
        );
        let slots = (0..depth)
            .map(|_| FrameResources::new(item_capacity, material_capacity, wave_vertex_count))
            .collect();
        Ok(Self { slots, current: 0 })
    }

    /// Ring depth
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Index of the active slot
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Active slot, read-only
    pub fn current(&self) -> &FrameResources {
        &self.slots[self.current]
    }

    /// Active slot for this frame's writes
    pub fn current_mut(&mut self) -> &mut FrameResources {
        &mut self.slots[self.current]
    }

    /// Move to the next slot, blocking until the GPU has retired the work
    /// previously submitted against it.
    ///
    /// This is the only blocking point in the frame loop; it bounds how far
    /// the CPU can run ahead of the GPU to the ring depth. A failed wait is
    /// device loss and is returned as-is, never retried.
    pub fn advance(&mut self, fence: &impl GpuFence) -> Result<(), RenderError> {
        self.current = (self.current + 1) % self.slots.len();
        let slot = &self.slots[self.current];
        if slot.fence_value != 0 && fence.completed_value() < slot.fence_value {
            log::trace!(
                "frame ring: waiting on fence {} for slot {}",
                slot.fence_value,
                self.current
            );
            fence.wait_for(slot.fence_value)?;
        }
        Ok(())
    }

    /// Record the fence value signaled after submitting the current slot's
    /// GPU work. Must be nonzero: zero marks a never-submitted slot.
    pub fn record_fence(&mut self, value: u64) {
        assert!(value != 0, "fence value 0 is reserved for unused slots");
        self.slots[self.current].fence_value = value;
    }
}
