//! Core geometry types shared by the planner and its callers

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Integer axis-aligned bounding box (`min` inclusive, `max` exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Bounds of a `width` x `height` box anchored at the origin
    pub fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> i32 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn height(&self) -> i32 {
        self.max_y.saturating_sub(self.min_y)
    }

    /// Width and height, each raised to at least 1
    pub fn planning_size(&self) -> (i32, i32) {
        (self.width().max(1), self.height().max(1))
    }
}

/// Anything that can report an integer bounding box
pub trait AreaBounds {
    fn bounds(&self) -> Bounds;
}

impl AreaBounds for Bounds {
    fn bounds(&self) -> Bounds {
        *self
    }
}

/// A named room or sub-region described by its outline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Area {
    pub name: String,
    points: Vec<IVec2>,
    #[serde(skip)]
    cached: Option<Bounds>,
}

impl Area {
    pub fn new(name: impl Into<String>, points: Vec<IVec2>) -> Self {
        let mut area = Self { name: name.into(), points, cached: None };
        area.cached = Some(area.compute_bounds());
        area
    }

    /// Axis-aligned rectangle with its top-left corner at `origin`
    pub fn rect(name: impl Into<String>, origin: IVec2, width: i32, height: i32) -> Self {
        let points = vec![
            origin,
            origin + IVec2::new(width, 0),
            origin + IVec2::new(width, height),
            origin + IVec2::new(0, height),
        ];
        Self::new(name, points)
    }

    /// Shift every outline point by `(dx, dy)`
    pub fn apply_offset(&mut self, dx: i32, dy: i32) {
        let delta = IVec2::new(dx, dy);
        for p in &mut self.points {
            *p += delta;
        }
        self.cached = Some(self.compute_bounds());
    }

    fn compute_bounds(&self) -> Bounds {
        let Some(first) = self.points.first() else {
            return Bounds::default();
        };
        let (mut min, mut max) = (*first, *first);
        for p in &self.points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Bounds::new(min.x, min.y, max.x, max.y)
    }
}

impl AreaBounds for Area {
    fn bounds(&self) -> Bounds {
        self.cached.unwrap_or_else(|| self.compute_bounds())
    }
}
