//! Stale-result guard for interactive callers.
//!
//! A user can submit a new site before the previous computation finishes.
//! Each computation takes a generation number when it starts; when it
//! completes, its report is published only if no newer computation has
//! started since. A stale result is discarded — it can never overwrite a
//! newer report.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use ring_census_geometry::GeometryProvider;
use ring_census_source::SpatialDataSource;
use ring_census_summary::SiteReport;

use crate::{SiteError, SiteInput, SiteOptions, compute_site};

/// Serializes report publication across overlapping site computations.
#[derive(Default)]
pub struct SiteSession {
    generation: AtomicU64,
    published: Mutex<Option<(u64, SiteReport)>>,
}

impl SiteSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a site computation under this session's staleness guard.
    ///
    /// Returns `Ok(Some(report))` when the result is fresh and was
    /// published, `Ok(None)` when a newer computation started in the
    /// meantime and the result was discarded.
    ///
    /// # Errors
    ///
    /// Propagates [`SiteError`] from the underlying computation.
    ///
    /// # Panics
    ///
    /// Panics if the publication mutex is poisoned.
    pub async fn compute(
        &self,
        input: &SiteInput,
        source: &dyn SpatialDataSource,
        provider: &dyn GeometryProvider,
        options: &SiteOptions,
    ) -> Result<Option<SiteReport>, SiteError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let report = compute_site(input, source, provider, options).await?;

        if self.generation.load(Ordering::SeqCst) != generation {
            log::info!(
                "Discarding stale report for site '{}' (a newer computation started)",
                report.site_name
            );
            return Ok(None);
        }

        let mut slot = self.published.lock().expect("Session mutex poisoned");
        *slot = Some((generation, report.clone()));
        Ok(Some(report))
    }

    /// The most recently published report, if any.
    ///
    /// # Panics
    ///
    /// Panics if the publication mutex is poisoned.
    #[must_use]
    pub fn latest(&self) -> Option<SiteReport> {
        self.published
            .lock()
            .expect("Session mutex poisoned")
            .as_ref()
            .map(|(_, report)| report.clone())
    }
}
