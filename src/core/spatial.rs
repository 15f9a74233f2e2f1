//! Spatial-Index (KD-Tree) für schnelle Segment-Abfragen auf der Routen-Polyline.

use std::collections::BTreeSet;

use kiddo::{KdTree, SquaredEuclidean};

use crate::shared::geo::{self, Coordinate, LocalFrame};

/// Unterhalb dieser Segmentanzahl wird linear gesucht.
const LINEAR_SCAN_LIMIT: usize = 32;

/// Read-only Spatial-Index über allen Segmenten einer Route.
///
/// Indexiert werden die Segment-Endpunkte in einer lokalen Meter-Projektion.
/// Eine Abfrage liefert alle Segmente, die den nächstgelegenen Punkt der
/// Route enthalten können: Liegt der nächste Vertex in Distanz `d`, dann hat
/// das beste Segment einen Endpunkt innerhalb von `d + max_len / 2`.
#[derive(Debug, Clone)]
pub struct RouteIndex {
    frame: LocalFrame,
    tree: KdTree<f64, 2>,
    vertex_segments: Vec<usize>,
    segment_count: usize,
    half_max_segment_m: f64,
}

impl RouteIndex {
    /// Erstellt einen leeren Index.
    pub fn empty() -> Self {
        Self {
            frame: LocalFrame::new(Coordinate::new(0.0, 0.0)),
            tree: (&Vec::<[f64; 2]>::new()).into(),
            vertex_segments: Vec::new(),
            segment_count: 0,
            half_max_segment_m: 0.0,
        }
    }

    /// Baut einen neuen Index aus Segmenten (Start, Ende).
    pub fn from_segments(segments: &[(Coordinate, Coordinate)]) -> Self {
        let Some(&(origin, _)) = segments.first() else {
            return Self::empty();
        };
        let frame = LocalFrame::new(origin);

        let mut entries = Vec::with_capacity(segments.len() * 2);
        let mut vertex_segments = Vec::with_capacity(segments.len() * 2);
        let mut max_len: f64 = 0.0;

        for (i, &(a, b)) in segments.iter().enumerate() {
            let pa = frame.to_local(a);
            let pb = frame.to_local(b);
            entries.push([pa.x, pa.y]);
            vertex_segments.push(i);
            if pa != pb {
                entries.push([pb.x, pb.y]);
                vertex_segments.push(i);
            }
            max_len = max_len.max(geo::haversine_distance(a, b));
        }

        let tree: KdTree<f64, 2> = (&entries).into();

        Self {
            frame,
            tree,
            vertex_segments,
            segment_count: segments.len(),
            half_max_segment_m: max_len / 2.0,
        }
    }

    /// Gibt die Anzahl indexierter Segmente zurück.
    pub fn len(&self) -> usize {
        self.segment_count
    }

    /// Gibt `true` zurück, wenn keine Segmente im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.segment_count == 0
    }

    /// Kandidaten-Segmente (aufsteigend sortiert) für die Nächster-Punkt-Suche.
    pub fn candidates(&self, query: Coordinate) -> Vec<usize> {
        if self.is_empty() {
            return Vec::new();
        }
        if self.segment_count <= LINEAR_SCAN_LIMIT {
            return (0..self.segment_count).collect();
        }

        let q = self.frame.to_local(query);
        let nearest = self.tree.nearest_one::<SquaredEuclidean>(&[q.x, q.y]);
        // Projektionsfehler der lokalen Ebene über lange Routen abfangen
        let radius = (nearest.distance.sqrt() + self.half_max_segment_m) * 1.01 + 5.0;

        let found: BTreeSet<usize> = self
            .tree
            .within::<SquaredEuclidean>(&[q.x, q.y], radius * radius)
            .into_iter()
            .filter_map(|entry| self.vertex_segments.get(entry.item as usize).copied())
            .collect();

        if found.is_empty() {
            log::error!("RouteIndex: keine Kandidaten trotz Nearest-Treffer, lineare Suche");
            return (0..self.segment_count).collect();
        }
        found.into_iter().collect()
    }
}
