use crate::shading::CellShading;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use lifegrid_kernel::GridGeometry;

/// Per-cell instance record, laid out for direct upload to a vertex buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CellInstance {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    pub color: [f32; 4],
}

impl CellInstance {
    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&[self.model_0, self.model_1, self.model_2, self.model_3])
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Unit quad centered on the origin in the XY plane.
pub fn quad_mesh() -> ([QuadVertex; 4], [u16; 6]) {
    let v = |x: f32, y: f32, u: f32, w: f32| QuadVertex {
        position: [x, y, 0.0],
        uv: [u, w],
    };
    (
        [
            v(-0.5, -0.5, 0.0, 0.0),
            v(0.5, -0.5, 1.0, 0.0),
            v(-0.5, 0.5, 0.0, 1.0),
            v(0.5, 0.5, 1.0, 1.0),
        ],
        [0, 2, 1, 2, 3, 1],
    )
}

/// Model matrix placing a unit quad over one cell.
pub fn cell_transform(geometry: &GridGeometry, grid_id: usize) -> Mat4 {
    let center = geometry.cell_center(geometry.coord_of(grid_id));
    Mat4::from_scale_rotation_translation(
        Vec3::splat(geometry.cell_size()),
        Quat::IDENTITY,
        center.extend(0.0),
    )
}

/// Instance records for every cell, in grid-id order.
///
/// Transforms never change after construction, so a batch is built once and
/// only its colors are refreshed per frame.
#[derive(Debug, Clone)]
pub struct InstanceBatch {
    instances: Vec<CellInstance>,
}

impl InstanceBatch {
    pub fn build(geometry: &GridGeometry, shading: &CellShading) -> Self {
        let instances = (0..geometry.cell_count())
            .map(|id| {
                let cols = cell_transform(geometry, id).to_cols_array_2d();
                let color = shading.color(id).unwrap_or(shading.dead_color()).to_array();
                CellInstance {
                    model_0: cols[0],
                    model_1: cols[1],
                    model_2: cols[2],
                    model_3: cols[3],
                    color,
                }
            })
            .collect();
        tracing::debug!(count = geometry.cell_count(), "instance batch built");
        Self { instances }
    }

    /// Copy the current colors into the batch.
    pub fn refresh_colors(&mut self, shading: &CellShading) {
        for (instance, color) in self.instances.iter_mut().zip(shading.colors()) {
            instance.color = color.to_array();
        }
    }

    pub fn instances(&self) -> &[CellInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Raw bytes of the instance buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}
