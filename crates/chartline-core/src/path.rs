//! Path streams: the geometry abstraction the reducer reads and writes.
//!
//! A [`PathSource`] is anything that can replay its outline as a finite,
//! forward-only sequence of [`PathSegment`]s. Calling
//! [`segments`](PathSource::segments) again restarts from the beginning.
//! Keeping the reducer behind this trait decouples it from any particular
//! geometry library; a renderer adapter only has to yield move-to and
//! line-to segments.

use crate::types::{Point, Polyline};

/// One step of a path outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Start a new sub-path at the point.
    MoveTo(Point),
    /// Draw a straight line from the current point to the point.
    LineTo(Point),
}

impl PathSegment {
    /// The end point of the segment, regardless of its tag.
    #[must_use]
    pub const fn point(self) -> Point {
        match self {
            Self::MoveTo(p) | Self::LineTo(p) => p,
        }
    }
}

/// A replayable sequence of path segments.
pub trait PathSource {
    /// Iterate the segments from the start of the path.
    fn segments(&self) -> impl Iterator<Item = PathSegment> + '_;

    /// Iterate only the segment end points.
    fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        self.segments().map(PathSegment::point)
    }
}

impl PathSource for Polyline {
    fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        self.points().iter().enumerate().map(|(i, &p)| {
            if i == 0 {
                PathSegment::MoveTo(p)
            } else {
                PathSegment::LineTo(p)
            }
        })
    }
}

impl PathSource for [PathSegment] {
    fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        self.iter().copied()
    }
}

impl PathSource for Vec<PathSegment> {
    fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        self.iter().copied()
    }
}

impl Polyline {
    /// Collect the end points of any path source into a polyline.
    #[must_use]
    pub fn from_source<P: PathSource + ?Sized>(source: &P) -> Self {
        source.vertices().collect()
    }
}
