use std::env;
use std::sync::OnceLock;

const THREAD_ENV: &str = "MLMAT_CPU_THREADS";
const DISABLE_ENV: &str = "MLMAT_DISABLE_PARALLEL";
const MIN_ELEMS_ENV: &str = "MLMAT_PARALLEL_MIN_ELEMS";

/// Elements per task below which elementwise work stays on the caller.
pub const DEFAULT_MIN_ELEMS: usize = 1000;

static THREAD_OVERRIDE: OnceLock<Option<usize>> = OnceLock::new();
static DISABLE_PARALLEL: OnceLock<bool> = OnceLock::new();
static MIN_ELEMENTS: OnceLock<usize> = OnceLock::new();
static ENV_PARALLELISM: OnceLock<Parallelism> = OnceLock::new();

pub fn thread_override() -> Option<usize> {
    *THREAD_OVERRIDE.get_or_init(|| match env::var(THREAD_ENV) {
        Ok(value) => match value.trim() {
            "" => None,
            raw => match raw.parse::<usize>() {
                Ok(0) => None,
                Ok(n) => Some(n),
                Err(_) => {
                    log::warn!("ignoring {THREAD_ENV}={raw:?}: not a thread count");
                    None
                }
            },
        },
        Err(_) => None,
    })
}

pub fn parallel_disabled() -> bool {
    *DISABLE_PARALLEL.get_or_init(|| {
        matches!(
            env::var(DISABLE_ENV)
                .ok()
                .map(|raw| raw.trim().to_ascii_lowercase()),
            Some(ref value) if value == "1" || value == "true" || value == "yes"
        )
    })
}

fn min_elements_threshold() -> usize {
    *MIN_ELEMENTS.get_or_init(|| match env::var(MIN_ELEMS_ENV) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => value,
            _ => {
                log::warn!("ignoring {MIN_ELEMS_ENV}={raw:?}, using {DEFAULT_MIN_ELEMS}");
                DEFAULT_MIN_ELEMS
            }
        },
        Err(_) => DEFAULT_MIN_ELEMS,
    })
}

fn detected_workers() -> usize {
    if parallel_disabled() {
        return 1;
    }
    thread_override().unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}

/// How an elementwise pass over `n` elements is divided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockPlan {
    pub blocks: usize,
    pub block_len: usize,
}

/// Fan-out configuration carried by every matrix.
///
/// A pass over `n` elements runs inline when `n <= min_elems_per_task` or
/// `max_workers <= 1`. Otherwise it is cut into
/// `min(ceil(n / min_elems_per_task), max_workers)` contiguous blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parallelism {
    pub min_elems_per_task: usize,
    pub max_workers: usize,
}

impl Parallelism {
    pub fn new(min_elems_per_task: usize, max_workers: usize) -> Self {
        Parallelism {
            min_elems_per_task: min_elems_per_task.max(1),
            max_workers,
        }
    }

    pub fn sequential() -> Self {
        Parallelism::new(DEFAULT_MIN_ELEMS, 1)
    }

    /// Process-wide configuration from `MLMAT_*` variables and the host's
    /// reported parallelism. Read once.
    pub fn from_env() -> Self {
        *ENV_PARALLELISM
            .get_or_init(|| Parallelism::new(min_elements_threshold(), detected_workers()))
    }

    pub fn plan(&self, n: usize) -> BlockPlan {
        if n <= self.min_elems_per_task || self.max_workers <= 1 {
            return BlockPlan {
                blocks: 1,
                block_len: n,
            };
        }
        let blocks = n.div_ceil(self.min_elems_per_task).min(self.max_workers);
        BlockPlan {
            blocks,
            block_len: n.div_ceil(blocks),
        }
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Parallelism::from_env()
    }
}

/// Runs `f(block, offset)` over contiguous, non-overlapping blocks of `data`
/// as laid out by `parallelism.plan`. `offset` is the global index of the
/// block's first element. Returns once every block has finished.
pub fn for_each_block<T, F>(data: &mut [T], parallelism: Parallelism, f: F)
where
    T: Send,
    F: Fn(&mut [T], usize) + Sync + Send,
{
    let plan = parallelism.plan(data.len());
    if plan.blocks <= 1 {
        f(data, 0);
        return;
    }
    log::trace!(
        "elementwise pass over {} elements in {} blocks of {}",
        data.len(),
        plan.blocks,
        plan.block_len
    );
    run_blocks(data, plan.block_len, f);
}

#[cfg(feature = "parallel")]
fn run_blocks<T, F>(data: &mut [T], block_len: usize, f: F)
where
    T: Send,
    F: Fn(&mut [T], usize) + Sync + Send,
{
    use rayon::prelude::*;
    ensure_rayon_pool();
    data.par_chunks_mut(block_len)
        .enumerate()
        .for_each(|(i, block)| f(block, i * block_len));
}

#[cfg(not(feature = "parallel"))]
fn run_blocks<T, F>(data: &mut [T], block_len: usize, f: F)
where
    T: Send,
    F: Fn(&mut [T], usize) + Sync + Send,
{
    data.chunks_mut(block_len)
        .enumerate()
        .for_each(|(i, block)| f(block, i * block_len));
}

#[cfg(feature = "parallel")]
use std::sync::Once;

#[cfg(feature = "parallel")]
static INIT_RAYON: Once = Once::new();

#[cfg(feature = "parallel")]
pub fn ensure_rayon_pool() {
    use rayon::ThreadPoolBuilder;
    INIT_RAYON.call_once(|| {
        let builder = match thread_override() {
            Some(threads) => ThreadPoolBuilder::new().num_threads(threads),
            None => ThreadPoolBuilder::new(),
        };
        if let Err(err) = builder.build_global() {
            log::trace!("global rayon pool already configured: {err}");
        }
    });
}

#[cfg(not(feature = "parallel"))]
pub fn ensure_rayon_pool() {}
