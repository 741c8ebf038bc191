use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;

/// Run a side-effect-only task over every item
///
/// With `workers <= 1` items are processed in order on the calling thread.
/// Otherwise a dedicated pool of `workers` threads takes them in no
/// particular order. The first error stops the run and is returned; items
/// already processed are left as they are.
pub fn run<T, F>(task: F, items: &[T], workers: usize) -> Result<()>
where
    T: Sync,
    F: Fn(&T) -> Result<()> + Sync,
{
    if workers <= 1 {
        debug!("Processing {} items sequentially", items.len());
        return items.iter().try_for_each(&task);
    }

    debug!("Processing {} items on {} workers", items.len(), workers);
    let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;
    pool.install(|| items.par_iter().try_for_each(|item| task(item)))
}
