#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::ThreadPool;
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use std::sync::OnceLock;

/// Crate-local Rayon pool shared by every column queue.
///
/// The global Rayon pool panics on first use when it cannot be initialised
/// (e.g. thread limits on a crowded CI host). A local pool lets us degrade to
/// inline execution instead.
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
static WORKER_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

/// Number of worker threads the pool is built with.
///
/// `RAYON_NUM_THREADS` wins when set to a positive integer, otherwise the
/// hardware parallelism is used.
pub fn available_workers() -> usize {
    let from_env = std::env::var("RAYON_NUM_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0);
    from_env.unwrap_or_else(hardware_parallelism)
}

/// Parallelism reported by the OS, or 1 when unknown.
pub fn hardware_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
fn build_worker_pool() -> Option<ThreadPool> {
    let requested = available_workers().max(1);
    let try_build = |n| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .thread_name(|i| format!("colframe-worker-{i}"))
            .build()
    };

    match try_build(requested) {
        Ok(pool) => Some(pool),
        Err(err) if requested > 1 => {
            log::warn!("failed to build {requested}-thread worker pool ({err}); retrying with 1");
            try_build(1).ok()
        }
        Err(err) => {
            log::warn!("failed to build worker pool ({err}); running column work inline");
            None
        }
    }
}

#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
fn worker_pool() -> Option<&'static ThreadPool> {
    WORKER_POOL.get_or_init(build_worker_pool).as_ref()
}

/// Runs `worker(id)` for every id in `0..workers` and returns once all of them
/// have finished.
///
/// Workers run concurrently on the pool when one is available, and one after
/// the other on the calling thread otherwise.
pub(crate) fn run_workers<F>(workers: usize, worker: F)
where
    F: Fn(usize) + Sync,
{
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    if workers > 1 {
        if let Some(pool) = worker_pool() {
            let worker = &worker;
            pool.scope(|scope| {
                for id in 0..workers {
                    scope.spawn(move |_| worker(id));
                }
            });
            return;
        }
    }

    for id in 0..workers {
        worker(id);
    }
}
