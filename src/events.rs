//! Stage-completion notifications
//!
//! [`World::generate_with_observer`](crate::World::generate_with_observer)
//! reports each finished stage synchronously, before the next stage starts.

use crate::centroid::Centroid;
use crate::cluster::Cluster;
use crate::placement::Placement;
use crate::region::Region;

/// A finished pipeline stage and the entities it produced
#[derive(Debug, Clone, Copy)]
pub enum GenerationEvent<'a> {
    /// Centroids are relaxed, lifted onto the terrain and indexed
    TessellationComplete { centroids: &'a [Centroid] },
    /// Clustering and region assignment are done
    RegionsComplete {
        clusters: &'a [Cluster],
        regions: &'a [Region],
    },
    /// Content placement is done for every region
    PlacementComplete { placements: &'a [Placement] },
}

impl GenerationEvent<'_> {
    /// Short stage name for logs and progress displays
    pub fn stage(&self) -> &'static str {
        match self {
            GenerationEvent::TessellationComplete { .. } => "tessellation",
            GenerationEvent::RegionsComplete { .. } => "regions",
            GenerationEvent::PlacementComplete { .. } => "placement",
        }
    }
}

/// Receiver for [`GenerationEvent`]s
pub trait GenerationObserver {
    fn on_event(&mut self, event: &GenerationEvent<'_>);
}

impl<F> GenerationObserver for F
where
    F: FnMut(&GenerationEvent<'_>),
{
    fn on_event(&mut self, event: &GenerationEvent<'_>) {
        self(event)
    }
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {
    fn on_event(&mut self, _event: &GenerationEvent<'_>) {}
}
