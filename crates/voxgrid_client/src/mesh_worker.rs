use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPoolBuildError;
use tracing::warn;
use voxgrid_core::events::{self, EventReceiver, EventSender};
use voxgrid_core::jobs::JobSystem;
use voxgrid_shared::chunk::ChunkData;
use voxgrid_shared::coords::ChunkPos;
use voxgrid_shared::voxel::VoxelTable;

use crate::renderer::mesh::{build_chunk_meshes, ChunkMeshCollection};

/// A chunk snapshot to mesh. `version` is the chunk's edit counter at the
/// time the snapshot was taken.
pub struct MeshRequest {
    pub chunk: ChunkData,
    pub table: Arc<VoxelTable>,
    pub version: u64,
}

#[derive(Debug)]
pub struct MeshResult {
    pub position: ChunkPos,
    pub meshes: ChunkMeshCollection,
    pub version: u64,
}

/// Meshes chunk snapshots on a background pool. In-flight work is never
/// cancelled; callers drop results whose `version` is out of date.
pub struct MeshWorker {
    jobs: JobSystem,
    completed_tx: EventSender<MeshResult>,
    completed_rx: EventReceiver<MeshResult>,
}

impl MeshWorker {
    /// `None` picks one thread fewer than the machine has, between 2 and 8.
    pub fn new(worker_threads: Option<usize>) -> Result<Self, ThreadPoolBuildError> {
        let threads = worker_threads.unwrap_or_else(default_worker_threads);
        let jobs = JobSystem::new("mesh-worker", Some(threads))?;
        let (completed_tx, completed_rx) = events::channel();

        Ok(Self {
            jobs,
            completed_tx,
            completed_rx,
        })
    }

    pub fn threads(&self) -> usize {
        self.jobs.threads()
    }

    pub fn submit(&self, request: MeshRequest) {
        let completed_tx = self.completed_tx.clone();
        self.jobs.spawn(move || {
            let meshes = build_chunk_meshes(&request.chunk, &request.table);
            let result = MeshResult {
                position: request.chunk.position(),
                meshes,
                version: request.version,
            };
            if completed_tx.send(result).is_err() {
                warn!("Mesh worker result dropped: receiver is gone");
            }
        });
    }

    /// Returns every result finished since the last call without blocking.
    pub fn poll(&self) -> Vec<MeshResult> {
        self.completed_rx.drain()
    }

    /// Blocks until the next result arrives.
    pub fn wait_one(&self) -> Option<MeshResult> {
        self.completed_rx.wait()
    }

    /// Meshes a batch synchronously, spreading chunks over the pool.
    pub fn mesh_all(&self, chunks: &[ChunkData], table: &VoxelTable) -> Vec<ChunkMeshCollection> {
        self.jobs.install(|| {
            chunks
                .par_iter()
                .map(|chunk| build_chunk_meshes(chunk, table))
                .collect()
        })
    }
}

fn default_worker_threads() -> usize {
    let available = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4);
    available.saturating_sub(1).clamp(2, 8)
}
