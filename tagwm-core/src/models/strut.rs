use super::Xyhw;
use serde::{Deserialize, Serialize};

/// A reservation along one screen edge.
///
/// `thickness` is measured inwards from the edge of an output. `start_offset` and
/// `end_extent` bound the reservation along the perpendicular axis in global
/// coordinates, `end_extent` being exclusive.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct StrutEdge {
    pub thickness: u32,
    pub start_offset: i32,
    pub end_extent: i32,
}

impl StrutEdge {
    /// A reservation spanning the whole edge.
    #[must_use]
    pub const fn new(thickness: u32) -> Self {
        Self {
            thickness,
            start_offset: i32::MIN,
            end_extent: i32::MAX,
        }
    }

    #[must_use]
    pub const fn partial(thickness: u32, start_offset: i32, end_extent: i32) -> Self {
        Self {
            thickness,
            start_offset,
            end_extent,
        }
    }

    /// Whether the reservation overlaps `[start, end)`.
    #[must_use]
    pub const fn overlaps(&self, start: i32, end: i32) -> bool {
        self.thickness > 0 && self.start_offset < end && start < self.end_extent
    }
}

/// Edge reservations declared by a single client.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Strut {
    pub top: Option<StrutEdge>,
    pub bottom: Option<StrutEdge>,
    pub left: Option<StrutEdge>,
    pub right: Option<StrutEdge>,
}

impl Strut {
    #[must_use]
    pub const fn with_top(mut self, edge: StrutEdge) -> Self {
        self.top = Some(edge);
        self
    }

    #[must_use]
    pub const fn with_bottom(mut self, edge: StrutEdge) -> Self {
        self.bottom = Some(edge);
        self
    }

    #[must_use]
    pub const fn with_left(mut self, edge: StrutEdge) -> Self {
        self.left = Some(edge);
        self
    }

    #[must_use]
    pub const fn with_right(mut self, edge: StrutEdge) -> Self {
        self.right = Some(edge);
        self
    }

    /// True when no edge reserves any space.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [self.top, self.bottom, self.left, self.right]
            .iter()
            .all(|edge| edge.map_or(true, |e| e.thickness == 0))
    }

    /// Builds a strut from the twelve cardinals of `_NET_WM_STRUT_PARTIAL`.
    ///
    /// Order: left, right, top, bottom, `left_start_y`, `left_end_y`, `right_start_y`,
    /// `right_end_y`, `top_start_x`, `top_end_x`, `bottom_start_x`, `bottom_end_x`.
    /// The protocol's end values are inclusive.
    #[must_use]
    pub fn from_partial(values: &[u32]) -> Option<Self> {
        if values.len() < 12 {
            return None;
        }
        let edge = |thickness: u32, start: u32, end: u32| {
            (thickness > 0).then(|| {
                StrutEdge::partial(
                    thickness,
                    to_coord(start),
                    to_coord(end).saturating_add(1),
                )
            })
        };
        Some(Self {
            left: edge(values[0], values[4], values[5]),
            right: edge(values[1], values[6], values[7]),
            top: edge(values[2], values[8], values[9]),
            bottom: edge(values[3], values[10], values[11]),
        })
    }

    /// Builds a strut from the four cardinals of the legacy `_NET_WM_STRUT`.
    #[must_use]
    pub fn from_legacy(values: &[u32]) -> Option<Self> {
        if values.len() < 4 {
            return None;
        }
        let edge = |thickness: u32| (thickness > 0).then(|| StrutEdge::new(thickness));
        Some(Self {
            left: edge(values[0]),
            right: edge(values[1]),
            top: edge(values[2]),
            bottom: edge(values[3]),
        })
    }
}

fn to_coord(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Space taken from each side of an output.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Margins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Margins {
    /// Grows each side to at least the thickness `strut` reserves on `bbox`.
    pub fn absorb(&mut self, strut: &Strut, bbox: &Xyhw) {
        let horizontal = |edge: Option<StrutEdge>| {
            edge.filter(|e| e.overlaps(bbox.x(), bbox.right()))
                .map_or(0, |e| e.thickness)
        };
        let vertical = |edge: Option<StrutEdge>| {
            edge.filter(|e| e.overlaps(bbox.y(), bbox.bottom()))
                .map_or(0, |e| e.thickness)
        };
        self.top = self.top.max(horizontal(strut.top));
        self.bottom = self.bottom.max(horizontal(strut.bottom));
        self.left = self.left.max(vertical(strut.left));
        self.right = self.right.max(vertical(strut.right));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_be_able_to_build_from_partial_strut() {
        let values = [0, 0, 30, 0, 0, 0, 0, 0, 0, 1919, 0, 0];
        let strut = Strut::from_partial(&values).expect("twelve values");
        assert_eq!(strut.top, Some(StrutEdge::partial(30, 0, 1920)));
        assert_eq!(strut.bottom, None);
        assert_eq!(strut.left, None);
    }

    #[test]
    fn short_partial_strut_is_rejected() {
        assert!(Strut::from_partial(&[0, 0, 30, 0]).is_none());
    }

    #[test]
    fn legacy_strut_spans_the_whole_edge() {
        let strut = Strut::from_legacy(&[0, 0, 0, 24]).expect("four values");
        assert_eq!(strut.bottom, Some(StrutEdge::new(24)));
        assert!(strut.top.is_none());
    }

    #[test]
    fn zero_thickness_struts_are_empty() {
        let strut = Strut::default().with_top(StrutEdge::new(0));
        assert!(strut.is_empty());
        assert!(!Strut::default().with_left(StrutEdge::new(1)).is_empty());
    }

    #[test]
    fn margins_ignore_edges_outside_of_the_output() {
        let right_monitor = Xyhw::new(1920, 0, 1920, 1080);
        let strut = Strut::default().with_top(StrutEdge::partial(30, 0, 1920));
        let mut margins = Margins::default();
        margins.absorb(&strut, &right_monitor);
        assert_eq!(margins.top, 0);

        let left_monitor = Xyhw::new(0, 0, 1920, 1080);
        margins.absorb(&strut, &left_monitor);
        assert_eq!(margins.top, 30);
    }
}
