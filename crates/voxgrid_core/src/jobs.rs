use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::debug;

/// Fixed-size worker pool shared by background jobs such as chunk meshing.
pub struct JobSystem {
    pool: ThreadPool,
    name: &'static str,
}

impl JobSystem {
    /// Builds a pool named `{name}-{index}`. `None` lets rayon pick one thread per core.
    pub fn new(name: &'static str, num_threads: Option<usize>) -> Result<Self, ThreadPoolBuildError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(move |index| format!("{name}-{index}"));
        if let Some(count) = num_threads {
            builder = builder.num_threads(count.max(1));
        }

        let pool = builder.build()?;
        debug!("Started job system '{name}' with {} threads", pool.current_num_threads());
        Ok(Self { pool, name })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }

    /// Runs `op` inside the pool so rayon parallel iterators use its threads.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}
