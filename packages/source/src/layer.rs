//! In-memory, R-tree-indexed population layer.
//!
//! Loads a `GeoJSON` `FeatureCollection` once, builds an R-tree over
//! feature bounding boxes, and serves intersection queries with an
//! envelope pre-filter followed by an exact predicate check.

use async_trait::async_trait;
use geo::{BoundingRect, Intersects, MultiPolygon};
use rstar::{AABB, RTree, RTreeObject};

use crate::{AreaFeature, LayerFields, SourceError, SpatialDataSource, SpatialPredicate};
use ring_census_geometry::Srs;

/// An areal feature stored in the R-tree with its envelope.
struct IndexedFeature {
    feature: AreaFeature,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// A population layer held entirely in memory.
///
/// Constructed once and shared across all site computations; queries are
/// read-only and safe to run concurrently.
pub struct MemoryLayer {
    id: String,
    srs: Srs,
    tree: RTree<IndexedFeature>,
}

impl MemoryLayer {
    /// Builds a layer from a `GeoJSON` `FeatureCollection` document.
    ///
    /// Features without a usable geometry or attributes are skipped with a
    /// warning (see [`crate::parse::parse_feature_collection`]); features
    /// whose geometry has no bounding box are dropped the same way.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the document itself cannot be parsed.
    pub fn from_geojson(
        id: &str,
        raw: &str,
        srs: Srs,
        fields: &LayerFields,
    ) -> Result<Self, SourceError> {
        let features = crate::parse::parse_feature_collection(raw, fields)?;

        let mut entries = Vec::with_capacity(features.len());
        for feature in features {
            let Some(envelope) = compute_envelope(&feature.geometry) else {
                log::warn!("Skipping feature '{}': empty bounding box", feature.id);
                continue;
            };
            entries.push(IndexedFeature { feature, envelope });
        }

        log::info!("Loaded {} features into layer '{id}'", entries.len());

        Ok(Self {
            id: id.to_string(),
            srs,
            tree: RTree::bulk_load(entries),
        })
    }

    /// Number of indexed features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the layer holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[async_trait]
impl SpatialDataSource for MemoryLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn srs(&self) -> Srs {
        self.srs
    }

    async fn query(
        &self,
        geometry: &MultiPolygon<f64>,
        predicate: SpatialPredicate,
    ) -> Result<Vec<AreaFeature>, SourceError> {
        let Some(envelope) = compute_envelope(geometry) else {
            return Ok(Vec::new());
        };

        let matches = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| match predicate {
                SpatialPredicate::Intersects => entry.feature.geometry.intersects(geometry),
            })
            .map(|entry| entry.feature.clone())
            .collect();

        Ok(matches)
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}
