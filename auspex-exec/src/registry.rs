//! Execution Surface Registry
//!
//! Maps each exposure key to its pre-provisioned execution surface. The
//! registry is populated during bootstrap and read-only afterwards, so the
//! router can resolve concurrently without locking.

use std::collections::HashMap;
use std::sync::Arc;

use auspex_domain::ExposureKey;

use crate::error::{ExecError, ExecResult};
use crate::ports::BrowserPort;
use crate::surface::ExecutionSurface;

/// Registry of live execution surfaces, one per exposure key.
#[derive(Debug)]
pub struct SurfaceRegistry<B: BrowserPort> {
    surfaces: HashMap<ExposureKey, Arc<ExecutionSurface<B>>>,
}

impl<B: BrowserPort> SurfaceRegistry<B> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            surfaces: HashMap::new(),
        }
    }

    /// Register a surface under its exposure key.
    ///
    /// # Errors
    /// Returns `ExecError::DuplicateKey` if the key already holds a surface;
    /// bootstrap treats that as fatal.
    pub fn register(&mut self, surface: Arc<ExecutionSurface<B>>) -> ExecResult<()> {
        let key = surface.key().clone();
        if self.surfaces.contains_key(&key) {
            return Err(ExecError::DuplicateKey(key));
        }
        self.surfaces.insert(key, surface);
        Ok(())
    }

    /// Resolve the surface for an exposure key.
    ///
    /// # Errors
    /// Returns `ExecError::UnknownKey` if no surface was provisioned for the
    /// key; the caller drops the signal and alerts, the process keeps
    /// running.
    pub fn resolve(&self, key: &ExposureKey) -> ExecResult<Arc<ExecutionSurface<B>>> {
        self.surfaces
            .get(key)
            .cloned()
            .ok_or_else(|| ExecError::UnknownKey(key.clone()))
    }

    /// Iterate over all registered surfaces (shutdown cleanup).
    pub fn surfaces(&self) -> impl Iterator<Item = &Arc<ExecutionSurface<B>>> {
        self.surfaces.values()
    }

    /// Number of registered surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl<B: BrowserPort> Default for SurfaceRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PageOptions;
    use crate::stub::StubBrowser;
    use auspex_domain::{Direction, Instrument};

    async fn surface(
        browser: &Arc<StubBrowser>,
        direction: Direction,
    ) -> Arc<ExecutionSurface<StubBrowser>> {
        let page = browser.open_page(PageOptions::default()).await.unwrap();
        let key = ExposureKey::new(Instrument::new("ADA").unwrap(), direction);
        Arc::new(ExecutionSurface::new(key, browser.clone(), page))
    }

    #[tokio::test]
    async fn test_register_and_resolve() {
        let browser = Arc::new(StubBrowser::new());
        let mut registry = SurfaceRegistry::new();
        let long = surface(&browser, Direction::Long).await;
        let short = surface(&browser, Direction::Short).await;

        registry.register(long.clone()).unwrap();
        registry.register(short).unwrap();
        assert_eq!(registry.len(), 2);

        let key = ExposureKey::new(Instrument::new("ADA").unwrap(), Direction::Long);
        let resolved = registry.resolve(&key).unwrap();
        assert_eq!(resolved.key(), long.key());
    }

    #[tokio::test]
    async fn test_duplicate_key_is_rejected() {
        let browser = Arc::new(StubBrowser::new());
        let mut registry = SurfaceRegistry::new();

        registry.register(surface(&browser, Direction::Long).await).unwrap();
        let err = registry
            .register(surface(&browser, Direction::Long).await)
            .unwrap_err();

        assert!(matches!(err, ExecError::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let browser = Arc::new(StubBrowser::new());
        let registry: SurfaceRegistry<StubBrowser> = SurfaceRegistry::new();
        drop(browser);

        let key = ExposureKey::new(Instrument::new("ADA").unwrap(), Direction::Short);
        let err = registry.resolve(&key).unwrap_err();

        assert!(matches!(err, ExecError::UnknownKey(k) if k == key));
    }

    #[tokio::test]
    async fn test_resolve_returns_same_surface_every_time() {
        let browser = Arc::new(StubBrowser::new());
        let mut registry = SurfaceRegistry::new();
        registry.register(surface(&browser, Direction::Long).await).unwrap();

        let key = ExposureKey::new(Instrument::new("ADA").unwrap(), Direction::Long);
        let first = registry.resolve(&key).unwrap();
        let second = registry.resolve(&key).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }
}
