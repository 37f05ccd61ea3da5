//! # Voxel Writer
//!
//! Materialises the height field into the volume, one planar chunk per
//! call. The host decides when to call again; see [`VoxelWriter::next_chunk`].

use verdance_core::{RegionBuffer, VolumeResult, VoxelRegion, VoxelVolume};

use crate::geometry::Rect;
use crate::terrain::Terrain;

/// Outcome of one [`VoxelWriter::next_chunk`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterStep {
    /// One chunk was written.
    Written {
        /// Planar chunk index `(x, z)`.
        chunk: [i32; 2],
        /// Cells written.
        region: VoxelRegion,
    },
    /// Every chunk has been written.
    Done,
}

/// Chunk-by-chunk terrain fill.
#[derive(Debug, Clone)]
pub struct VoxelWriter {
    chunk_cells: i32,
    origin: [i32; 2],
    chunks: [i32; 2],
    next: i32,
    clipped_columns: u64,
}

impl VoxelWriter {
    /// Coarse samples per chunk edge used to bound the vertical fill.
    const COARSE_SAMPLES: i32 = 4;
    /// Voxels added above the coarse maximum to absorb peaks between samples.
    const COARSE_SLACK: f64 = 2.0;

    /// Creates a writer covering the whole grid.
    #[must_use]
    pub fn new(terrain: &Terrain, chunk_cells: u32) -> Self {
        let bounds = terrain.grid.bounds;
        let chunk_cells = chunk_cells.max(1) as i32;
        let span = [bounds.max[0] - bounds.min[0], bounds.max[2] - bounds.min[2]];
        Self {
            chunk_cells,
            origin: [bounds.min[0], bounds.min[2]],
            chunks: [
                (span[0] + chunk_cells - 1) / chunk_cells,
                (span[1] + chunk_cells - 1) / chunk_cells,
            ],
            next: 0,
            clipped_columns: 0,
        }
    }

    /// Number of planar chunks.
    #[must_use]
    pub fn total_chunks(&self) -> u32 {
        (self.chunks[0] * self.chunks[1]) as u32
    }

    /// Chunks written so far.
    #[must_use]
    pub fn chunks_written(&self) -> u32 {
        self.next as u32
    }

    /// Returns true once every chunk has been written.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.next >= self.chunks[0] * self.chunks[1]
    }

    /// Columns whose surface rose above the volume ceiling.
    #[must_use]
    pub const fn clipped_columns(&self) -> u64 {
        self.clipped_columns
    }

    /// Fills the next chunk and writes it with a single region write.
    ///
    /// # Errors
    ///
    /// Propagates the volume's rejection of the write. The writer does not
    /// advance past a rejected chunk.
    pub fn next_chunk<V: VoxelVolume + ?Sized>(
        &mut self,
        terrain: &Terrain,
        volume: &mut V,
    ) -> VolumeResult<WriterStep> {
        if self.is_done() {
            return Ok(WriterStep::Done);
        }
        let chunk = [self.next % self.chunks[0], self.next / self.chunks[0]];
        let grid = &terrain.grid;
        let bounds = grid.bounds;
        let min = [
            self.origin[0] + chunk[0] * self.chunk_cells,
            self.origin[1] + chunk[1] * self.chunk_cells,
        ];
        let max = [
            (min[0] + self.chunk_cells).min(bounds.max[0]),
            (min[1] + self.chunk_cells).min(bounds.max[2]),
        ];

        let s = grid.voxel_size;
        let extent = Rect::new(
            [f64::from(min[0]) * s, f64::from(min[1]) * s],
            [f64::from(max[0]) * s, f64::from(max[1]) * s],
        );
        let coarse = coarse_max_height(terrain, &extent, Self::COARSE_SAMPLES) + Self::COARSE_SLACK * s;

        let mut fill = fill_chunk(terrain, min, max, coarse);
        if fill.needs_taller_region() {
            tracing::debug!(
                "chunk {:?}: surface {:.2} above coarse bound {:.2}, refilling",
                chunk,
                fill.top,
                coarse
            );
            fill = fill_chunk(terrain, min, max, fill.top);
        }

        let ceiling = f64::from(bounds.max[1]) * s;
        if fill.top >= ceiling {
            let over = fill.surfaces.iter().filter(|h| **h >= ceiling).count() as u64;
            self.clipped_columns += over;
            tracing::warn!(
                "chunk {:?}: {} column(s) rise above the volume ceiling and were clamped",
                chunk,
                over
            );
        }
        let region = fill.buffer.region();
        volume.write_region(&fill.buffer)?;

        self.next += 1;
        Ok(WriterStep::Written { chunk, region })
    }
}

/// Filled cells of one planar chunk.
struct ChunkFill {
    buffer: RegionBuffer,
    /// Exact column surfaces, row-major in x.
    surfaces: Vec<f64>,
    /// Highest exact column surface.
    top: f64,
    /// World height of the top of the buffer.
    region_top: f64,
    /// The buffer already reaches the volume ceiling.
    at_ceiling: bool,
}

impl ChunkFill {
    fn needs_taller_region(&self) -> bool {
        self.top >= self.region_top && !self.at_ceiling
    }
}

/// Fills columns `[min, max)` into a buffer whose vertical range reaches
/// `bound`, sampling the exact surface at every column centre.
fn fill_chunk(terrain: &Terrain, min: [i32; 2], max: [i32; 2], bound: f64) -> ChunkFill {
    let grid = &terrain.grid;
    let bounds = grid.bounds;
    let s = grid.voxel_size;
    let (_, y_max, _) = grid.cells_between(f64::from(bounds.min[1]) * s, bound);
    let y_max = y_max.max(bounds.min[1] + 1);
    let mut buffer = RegionBuffer::empty(VoxelRegion::new(
        [min[0], bounds.min[1], min[1]],
        [max[0], y_max, max[1]],
    ));

    let mut surfaces = Vec::with_capacity(((max[0] - min[0]) * (max[1] - min[1])) as usize);
    let mut top = f64::NEG_INFINITY;
    for cz in min[1]..max[1] {
        for cx in min[0]..max[0] {
            let [x, z] = grid.column_center(cx, cz);
            let h = terrain.height.height(x, z);
            top = top.max(h);
            terrain.fill_column(&mut buffer, cx, cz, h, terrain.zones.surface_material_at(x, z));
            surfaces.push(h);
        }
    }
    ChunkFill {
        buffer,
        surfaces,
        top,
        region_top: f64::from(y_max) * s,
        at_ceiling: y_max >= bounds.max[1],
    }
}

/// Maximum height over a `samples x samples` sub-grid of `rect`, edges
/// included.
fn coarse_max_height(terrain: &Terrain, rect: &Rect, samples: i32) -> f64 {
    let mut max = f64::NEG_INFINITY;
    for j in 0..=samples {
        for i in 0..=samples {
            let fx = f64::from(i) / f64::from(samples);
            let fz = f64::from(j) / f64::from(samples);
            let x = rect.min[0] + (rect.max[0] - rect.min[0]) * fx;
            let z = rect.min[1] + (rect.max[1] - rect.min[1]) * fz;
            max = max.max(terrain.height.height(x, z));
        }
    }
    max
}
