//! Caller-driven frame loop: edits arrive as commands, dirty chunks are
//! snapshotted and meshed in the background, and finished meshes are
//! flattened into upload buffers unless a newer edit has superseded them.

use std::fmt;
use std::sync::Arc;

use glam::IVec3;
use rayon::ThreadPoolBuildError;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};
use voxgrid_core::events::{self, EventReceiver, EventSender};
use voxgrid_shared::chunk::ChunkData;
use voxgrid_shared::coords::{world_to_chunk, ChunkPos};
use voxgrid_shared::voxel::{register_default_voxels, VoxelId, VoxelTable, VoxelTableError};
use voxgrid_shared::worldgen::WorldGenerator;

use crate::mesh_worker::{MeshRequest, MeshResult, MeshWorker};
use crate::renderer::atlas::AtlasLayout;
use crate::renderer::vertex::GpuMesh;
use crate::settings::ClientSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldCommand {
    SetVoxel { world: IVec3, voxel: VoxelId },
    Remesh(ChunkPos),
}

#[derive(Debug)]
pub enum AppError {
    VoxelTable(VoxelTableError),
    WorkerPool(ThreadPoolBuildError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VoxelTable(err) => write!(f, "voxel table error: {err}"),
            Self::WorkerPool(err) => write!(f, "failed to start mesh workers: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::VoxelTable(err) => Some(err),
            Self::WorkerPool(err) => Some(err),
        }
    }
}

impl From<VoxelTableError> for AppError {
    fn from(err: VoxelTableError) -> Self {
        Self::VoxelTable(err)
    }
}

impl From<ThreadPoolBuildError> for AppError {
    fn from(err: ThreadPoolBuildError) -> Self {
        Self::WorkerPool(err)
    }
}

struct ChunkSlot {
    data: ChunkData,
    version: u64,
    dirty: bool,
}

/// Loaded chunks plus an edit counter per chunk.
#[derive(Default)]
pub struct ClientWorld {
    chunks: FxHashMap<ChunkPos, ChunkSlot>,
}

impl ClientWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a chunk and queues it for meshing.
    pub fn insert(&mut self, chunk: ChunkData) {
        let pos = chunk.position();
        let version = self.version(pos).map_or(1, |version| version + 1);
        self.chunks.insert(
            pos,
            ChunkSlot {
                data: chunk,
                version,
                dirty: true,
            },
        );
    }

    pub fn get(&self, pos: ChunkPos) -> Option<&ChunkData> {
        self.chunks.get(&pos).map(|slot| &slot.data)
    }

    pub fn version(&self, pos: ChunkPos) -> Option<u64> {
        self.chunks.get(&pos).map(|slot| slot.version)
    }

    pub fn is_current(&self, pos: ChunkPos, version: u64) -> bool {
        self.version(pos) == Some(version)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dirty_count(&self) -> usize {
        self.chunks.values().filter(|slot| slot.dirty).count()
    }

    /// Returns false when the target chunk is not loaded.
    pub fn set_voxel(&mut self, world: IVec3, voxel: VoxelId) -> bool {
        let (pos, local) = world_to_chunk(world);
        let Some(slot) = self.chunks.get_mut(&pos) else {
            return false;
        };
        if slot.data.get(local) == voxel {
            return true;
        }
        slot.data.set(local, voxel);
        slot.version += 1;
        slot.dirty = true;
        true
    }

    pub fn mark_dirty(&mut self, pos: ChunkPos) -> bool {
        match self.chunks.get_mut(&pos) {
            Some(slot) => {
                slot.version += 1;
                slot.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Snapshots up to `limit` dirty chunks (lowest y first) and clears their flag.
    pub fn take_dirty(&mut self, limit: usize) -> Vec<(ChunkData, u64)> {
        let mut dirty: Vec<ChunkPos> = self
            .chunks
            .iter()
            .filter(|(_, slot)| slot.dirty)
            .map(|(pos, _)| *pos)
            .collect();
        dirty.sort_by_key(|pos| (pos.y, pos.z, pos.x));
        dirty.truncate(limit);

        dirty
            .into_iter()
            .filter_map(|pos| {
                let slot = self.chunks.get_mut(&pos)?;
                slot.dirty = false;
                Some((slot.data.clone(), slot.version))
            })
            .collect()
    }
}

pub struct UploadedMesh {
    pub version: u64,
    pub solid: GpuMesh,
    pub fluid: GpuMesh,
}

/// Stand-in for the GPU resource layer: holds the latest buffers per chunk.
#[derive(Default)]
pub struct MeshStore {
    uploaded: FxHashMap<ChunkPos, UploadedMesh>,
}

impl MeshStore {
    pub fn upload(&mut self, result: MeshResult, atlas: &AtlasLayout) {
        let origin = result.position.world_origin();
        let uploaded = UploadedMesh {
            version: result.version,
            solid: result.meshes.solid.to_gpu_mesh(origin, atlas),
            fluid: result.meshes.fluid.to_gpu_mesh(origin, atlas),
        };
        self.uploaded.insert(result.position, uploaded);
    }

    pub fn get(&self, pos: ChunkPos) -> Option<&UploadedMesh> {
        self.uploaded.get(&pos)
    }

    pub fn len(&self) -> usize {
        self.uploaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploaded.is_empty()
    }

    pub fn total_quads(&self) -> usize {
        self.uploaded
            .values()
            .map(|mesh| (mesh.solid.vertices.len() + mesh.fluid.vertices.len()) / 4)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub commands: usize,
    pub submitted: usize,
    pub uploaded: usize,
    pub stale: usize,
}

pub struct App {
    settings: ClientSettings,
    table: Arc<VoxelTable>,
    atlas: AtlasLayout,
    world: ClientWorld,
    store: MeshStore,
    worker: MeshWorker,
    command_tx: EventSender<WorldCommand>,
    command_rx: EventReceiver<WorldCommand>,
    in_flight: usize,
    frame: u64,
}

impl App {
    pub fn new(settings: ClientSettings) -> Result<Self, AppError> {
        let table = match &settings.voxel_table {
            Some(path) => VoxelTable::load(path)?,
            None => register_default_voxels(),
        };
        Self::with_table(settings, table)
    }

    pub fn with_table(settings: ClientSettings, table: VoxelTable) -> Result<Self, AppError> {
        let atlas = AtlasLayout::default();
        table.validate_textures(atlas.capacity())?;
        let worker = MeshWorker::new(settings.worker_threads)?;
        let (command_tx, command_rx) = events::channel();
        info!(
            "Client ready: {} voxel types, {} mesh worker threads",
            table.len(),
            worker.threads()
        );

        Ok(Self {
            settings,
            table: Arc::new(table),
            atlas,
            world: ClientWorld::new(),
            store: MeshStore::default(),
            worker,
            command_tx,
            command_rx,
            in_flight: 0,
            frame: 0,
        })
    }

    /// Sender for edits; may be cloned onto other threads.
    pub fn commands(&self) -> EventSender<WorldCommand> {
        self.command_tx.clone()
    }

    pub fn world(&self) -> &ClientWorld {
        &self.world
    }

    pub fn store(&self) -> &MeshStore {
        &self.store
    }

    pub fn table(&self) -> &VoxelTable {
        &self.table
    }

    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    /// Validates a chunk against the voxel table and queues it for meshing.
    pub fn load_chunk(&mut self, chunk: ChunkData) -> Result<(), AppError> {
        self.table.validate_chunk(&chunk)?;
        self.world.insert(chunk);
        Ok(())
    }

    /// Generates the chunks inside the configured view box around the origin.
    pub fn load_world(&mut self) -> Result<(), AppError> {
        let generator = WorldGenerator::new(self.settings.world_seed);
        let radius = self.settings.view_radius;
        for y in 0..self.settings.view_height {
            for z in -radius..=radius {
                for x in -radius..=radius {
                    self.load_chunk(generator.generate_chunk(ChunkPos::new(x, y, z)))?;
                }
            }
        }
        info!(
            "Generated {} chunks with seed {}",
            self.world.len(),
            generator.seed()
        );
        Ok(())
    }

    pub fn frame(&mut self) -> FrameStats {
        self.frame += 1;
        let mut stats = FrameStats {
            commands: self.apply_commands(),
            ..FrameStats::default()
        };

        for (chunk, version) in self.world.take_dirty(self.settings.max_submits_per_frame) {
            self.worker.submit(MeshRequest {
                chunk,
                table: Arc::clone(&self.table),
                version,
            });
            self.in_flight += 1;
            stats.submitted += 1;
        }

        for result in self.worker.poll() {
            self.accept(result, &mut stats);
        }
        stats
    }

    /// Runs frames until no chunk is dirty, no mesh is in flight and no
    /// command is queued.
    pub fn run_until_idle(&mut self) -> FrameStats {
        let mut total = FrameStats::default();
        loop {
            let stats = self.frame();
            total.commands += stats.commands;
            total.submitted += stats.submitted;
            total.uploaded += stats.uploaded;
            total.stale += stats.stale;

            while self.in_flight > 0 && self.world.dirty_count() == 0 {
                let Some(result) = self.worker.wait_one() else {
                    break;
                };
                self.accept(result, &mut total);
            }

            if self.in_flight == 0 && self.world.dirty_count() == 0 {
                let late = self.apply_commands();
                if late == 0 {
                    return total;
                }
                total.commands += late;
            }
        }
    }

    fn accept(&mut self, result: MeshResult, stats: &mut FrameStats) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.world.is_current(result.position, result.version) {
            debug!(
                "Uploading mesh for {:?} v{} ({} faces)",
                result.position,
                result.version,
                result.meshes.face_count()
            );
            self.store.upload(result, &self.atlas);
            stats.uploaded += 1;
        } else {
            debug!(
                "Dropping stale mesh for {:?} v{}",
                result.position, result.version
            );
            stats.stale += 1;
        }
    }

    fn apply_commands(&mut self) -> usize {
        let commands = self.command_rx.drain();
        let count = commands.len();
        for command in commands {
            self.apply_command(command);
        }
        count
    }

    fn apply_command(&mut self, command: WorldCommand) {
        match command {
            WorldCommand::SetVoxel { world, voxel } => {
                if !self.table.contains(voxel) {
                    warn!("Ignoring edit at {world}: voxel id {} is not defined", voxel.0);
                    return;
                }
                if !self.world.set_voxel(world, voxel) {
                    warn!("Ignoring edit at {world}: chunk not loaded");
                }
            }
            WorldCommand::Remesh(pos) => {
                if !self.world.mark_dirty(pos) {
                    warn!("Ignoring remesh of unloaded chunk {pos:?}");
                }
            }
        }
    }
}
