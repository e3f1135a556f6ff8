use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Install the SIGINT/SIGTERM handler and return the process-wide running
/// flag. The handler does nothing but an atomic store, so it is safe to
/// fire at any point in the sampling loop; the loop only reads the flag at
/// the top of each iteration.
pub fn install() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Error registering signal handler")?;

    Ok(running)
}
