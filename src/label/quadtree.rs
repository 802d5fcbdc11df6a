use super::Rect;

/// Spatial index over label rectangles, rebuilt every frame.
///
/// Quadrants live in a flat arena that [`QuadTree::reset`] clears and
/// repopulates, so the per-frame rebuild allocates nothing once the
/// arena has warmed up. Items are `(id, rect)` pairs where `id` indexes
/// the frame's rect slice; a rectangle straddling a split boundary is
/// stored in every leaf it overlaps, and `query` de-duplicates.
#[derive(Debug)]
pub struct QuadTree {
    quads: Vec<Quad>,
    capacity: usize,
}

#[derive(Debug)]
struct Quad {
    bounds: Rect,
    items: Vec<(usize, Rect)>,
    children: Option<[usize; 4]>,
}

impl QuadTree {
    pub fn new(capacity: usize) -> Self {
        Self {
            quads: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Drop all quadrants and start a fresh tree over `bounds`.
    pub fn reset(&mut self, bounds: Rect) {
        self.quads.clear();
        self.quads.push(Quad {
            bounds,
            items: Vec::new(),
            children: None,
        });
    }

    /// Insert a rect into every leaf it overlaps. Returns false when
    /// the rect falls entirely outside the tree bounds.
    pub fn insert(&mut self, id: usize, rect: Rect) -> bool {
        if self.quads.is_empty() {
            return false;
        }
        self.insert_at(0, id, rect)
    }

    fn insert_at(&mut self, quad: usize, id: usize, rect: Rect) -> bool {
        if !rect.overlaps(&self.quads[quad].bounds) {
            return false;
        }

        if self.quads[quad].children.is_none() {
            if self.quads[quad].items.len() < self.capacity {
                self.quads[quad].items.push((id, rect));
                return true;
            }
            self.subdivide(quad);
        }

        let children = self.quads[quad]
            .children
            .expect("subdivided quadrant has children");
        let mut inserted = false;
        for child in children {
            inserted |= self.insert_at(child, id, rect);
        }
        inserted
    }

    fn subdivide(&mut self, quad: usize) {
        let bounds = self.quads[quad].bounds;
        let w = bounds.width / 2.0;
        let h = bounds.height / 2.0;
        let quarters = [
            Rect::new(bounds.x, bounds.y, w, h),
            Rect::new(bounds.x + w, bounds.y, w, h),
            Rect::new(bounds.x, bounds.y + h, w, h),
            Rect::new(bounds.x + w, bounds.y + h, w, h),
        ];

        let first = self.quads.len();
        for quarter in quarters {
            self.quads.push(Quad {
                bounds: quarter,
                items: Vec::new(),
                children: None,
            });
        }
        let children = [first, first + 1, first + 2, first + 3];
        self.quads[quad].children = Some(children);

        let items = std::mem::take(&mut self.quads[quad].items);
        for (id, rect) in items {
            for child in children {
                self.insert_at(child, id, rect);
            }
        }
    }

    /// Ids of all stored rects overlapping `range`, each reported once.
    pub fn query(&self, range: &Rect) -> Vec<usize> {
        let mut found = Vec::new();
        if !self.quads.is_empty() {
            self.query_at(0, range, &mut found);
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    fn query_at(&self, quad: usize, range: &Rect, found: &mut Vec<usize>) {
        let node = &self.quads[quad];
        if !range.overlaps(&node.bounds) {
            return;
        }
        match node.children {
            Some(children) => {
                for child in children {
                    self.query_at(child, range, found);
                }
            }
            None => {
                for (id, rect) in &node.items {
                    if range.overlaps(rect) {
                        found.push(*id);
                    }
                }
            }
        }
    }

    #[cfg(test)]
    fn quad_count(&self) -> usize {
        self.quads.len()
    }
}
