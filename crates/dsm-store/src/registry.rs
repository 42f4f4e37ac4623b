//! The mutable set of registered elevation layers.

use crate::layer::DsmLayer;
use rf_common::GeoBounds;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

/// Identifier handed back by [`DsmRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Change notification delivered to registry subscribers.
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    LayerAdded(Arc<DsmLayer>),
    LayerRemoved(Uuid),
    Cleared,
}

type Subscriber = Box<dyn Fn(&RegistryEvent) + Send + Sync>;

/// An unordered set of immutable layers plus a change-observer list.
///
/// Layers are added by ingest, removed individually or en masse, never
/// mutated in place. Reads take a snapshot of the layer list, so
/// elevation sampling never holds a lock while running projection math.
#[derive(Default)]
pub struct DsmRegistry {
    layers: RwLock<Vec<Arc<DsmLayer>>>,
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    next_subscription: AtomicU64,
}

impl DsmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parsed layer. Returns the shared handle.
    pub fn add(&self, layer: DsmLayer) -> Arc<DsmLayer> {
        let layer = Arc::new(layer);
        self.layers.write().unwrap().push(Arc::clone(&layer));
        info!(
            layer = %layer.name,
            id = %layer.id,
            width = layer.width,
            height = layer.height,
            "registered DSM layer"
        );
        self.notify(&RegistryEvent::LayerAdded(Arc::clone(&layer)));
        layer
    }

    /// Remove a layer by id. Returns whether a layer was removed.
    pub fn remove(&self, id: Uuid) -> bool {
        let removed = {
            let mut layers = self.layers.write().unwrap();
            let before = layers.len();
            layers.retain(|l| l.id != id);
            layers.len() != before
        };
        if removed {
            info!(%id, "removed DSM layer");
            self.notify(&RegistryEvent::LayerRemoved(id));
        }
        removed
    }

    /// Drop every layer.
    pub fn clear_all(&self) {
        self.layers.write().unwrap().clear();
        info!("cleared DSM registry");
        self.notify(&RegistryEvent::Cleared);
    }

    /// Snapshot of the registered layers in insertion order.
    pub fn layers(&self) -> Vec<Arc<DsmLayer>> {
        self.layers.read().unwrap().clone()
    }

    /// Look up a layer by id.
    pub fn layer(&self, id: Uuid) -> Option<Arc<DsmLayer>> {
        self.layers
            .read()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned()
    }

    /// Number of registered layers.
    pub fn len(&self) -> usize {
        self.layers.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.read().unwrap().is_empty()
    }

    /// Union of every layer's WGS84 bounds, for coverage display.
    pub fn coverage_bounds(&self) -> Option<GeoBounds> {
        let layers = self.layers.read().unwrap();
        let mut iter = layers.iter();
        let first = iter.next()?.bounds;
        Some(iter.fold(first, |acc, l| acc.union(&l.bounds)))
    }

    /// Sample the elevation at a WGS84 point, in metres.
    ///
    /// Layers are consulted in insertion order; the first layer covering
    /// the point decides. `None` means no registered layer has data there.
    pub fn elevation_at(&self, lat: f64, lon: f64) -> Option<f64> {
        let layers = self.layers.read().unwrap().clone();
        for layer in layers {
            if let Some(elevation) = layer.sample(lat, lon) {
                return Some(elevation);
            }
        }
        None
    }

    /// Register a change observer. The callback fires synchronously on
    /// every mutation until unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&RegistryEvent) + Send + Sync + 'static,
    {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap()
            .insert(id, Box::new(callback));
        SubscriptionId(id)
    }

    /// Drop a change observer.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().unwrap().remove(&id.0);
    }

    fn notify(&self, event: &RegistryEvent) {
        let subscribers = self.subscribers.lock().unwrap();
        for callback in subscribers.values() {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_common::GeoBounds;
    use std::sync::atomic::AtomicUsize;

    fn layer(name: &str, elevation: f32, bounds: GeoBounds) -> DsmLayer {
        DsmLayer::new(name, 4, 4, vec![elevation; 16], -9999.0, bounds, None).unwrap()
    }

    #[test]
    fn test_add_remove_clear() {
        let registry = DsmRegistry::new();
        let a = registry.add(layer("a", 10.0, GeoBounds::new(34.0, 31.0, 35.0, 32.0)));
        registry.add(layer("b", 20.0, GeoBounds::new(35.0, 31.0, 36.0, 32.0)));
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(a.id));
        assert!(!registry.remove(a.id));
        assert_eq!(registry.len(), 1);

        registry.clear_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_first_covering_layer_wins() {
        let registry = DsmRegistry::new();
        registry.add(layer("first", 100.0, GeoBounds::new(34.0, 31.0, 35.0, 32.0)));
        registry.add(layer("second", 200.0, GeoBounds::new(34.0, 31.0, 35.0, 32.0)));

        assert_eq!(registry.elevation_at(31.5, 34.5), Some(100.0));
    }

    #[test]
    fn test_fallthrough_to_covering_layer() {
        let registry = DsmRegistry::new();
        // First layer covers the point but holds only sentinel samples
        let holes = DsmLayer::new(
            "holes",
            4,
            4,
            vec![-9999.0; 16],
            -9999.0,
            GeoBounds::new(34.0, 31.0, 35.0, 32.0),
            None,
        )
        .unwrap();
        registry.add(holes);
        registry.add(layer("solid", 80.0, GeoBounds::new(34.0, 31.0, 35.0, 32.0)));

        assert_eq!(registry.elevation_at(31.5, 34.5), Some(80.0));
    }

    #[test]
    fn test_no_coverage_is_none() {
        let registry = DsmRegistry::new();
        registry.add(layer("a", 10.0, GeoBounds::new(34.0, 31.0, 35.0, 32.0)));
        assert_eq!(registry.elevation_at(40.0, 10.0), None);
    }

    #[test]
    fn test_coverage_bounds_union() {
        let registry = DsmRegistry::new();
        assert!(registry.coverage_bounds().is_none());

        registry.add(layer("a", 1.0, GeoBounds::new(34.0, 31.0, 35.0, 32.0)));
        registry.add(layer("b", 2.0, GeoBounds::new(34.5, 30.0, 36.0, 31.5)));
        assert_eq!(
            registry.coverage_bounds(),
            Some(GeoBounds::new(34.0, 30.0, 36.0, 32.0))
        );
    }

    #[test]
    fn test_subscription_lifecycle() {
        let registry = DsmRegistry::new();
        let events = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&events);
        let sub = registry.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let l = registry.add(layer("a", 1.0, GeoBounds::new(34.0, 31.0, 35.0, 32.0)));
        registry.remove(l.id);
        assert_eq!(events.load(Ordering::SeqCst), 2);

        registry.unsubscribe(sub);
        registry.clear_all();
        assert_eq!(events.load(Ordering::SeqCst), 2);
    }
}
