/// Per-pixel depth buffer
#[derive(Debug, Clone)]
pub struct ZBuffer {
    width: usize,
    height: usize,
    depth: Vec<f32>,
}

impl ZBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            depth: vec![f32::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depth.fill(f32::INFINITY);
    }

    /// Resize and clear, reusing the allocation where possible
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.depth.clear();
        self.depth.resize(width * height, f32::INFINITY);
    }

    /// Stored depth at `(x, y)`, `None` outside the buffer
    pub fn get(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|idx| self.depth[idx])
    }

    /// Record `depth` at `(x, y)` if it is strictly nearer than what is stored.
    ///
    /// Returns whether the write happened. Out-of-bounds coordinates never
    /// write. Equal depths keep the existing value.
    pub fn test_and_set(&mut self, x: i32, y: i32, depth: f32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        if depth < self.depth[idx] {
            self.depth[idx] = depth;
            true
        } else {
            false
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearer_wins() {
        let mut zbuffer = ZBuffer::new(4, 4);
        assert!(zbuffer.test_and_set(1, 2, 5.0));
        assert!(zbuffer.test_and_set(1, 2, 3.0));
        assert_eq!(zbuffer.get(1, 2), Some(3.0));
        assert!(!zbuffer.test_and_set(1, 2, 4.0));
        assert_eq!(zbuffer.get(1, 2), Some(3.0));
    }

    #[test]
    fn test_equal_depth_keeps_first() {
        let mut zbuffer = ZBuffer::new(2, 2);
        assert!(zbuffer.test_and_set(0, 0, 0.5));
        assert!(!zbuffer.test_and_set(0, 0, 0.5));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut zbuffer = ZBuffer::new(3, 2);
        assert!(!zbuffer.test_and_set(-1, 0, 0.0));
        assert!(!zbuffer.test_and_set(3, 0, 0.0));
        assert!(!zbuffer.test_and_set(0, 2, 0.0));
        assert_eq!(zbuffer.get(0, 2), None);
    }

    #[test]
    fn test_clear() {
        let mut zbuffer = ZBuffer::new(2, 2);
        zbuffer.test_and_set(1, 1, -0.5);
        zbuffer.clear();
        assert_eq!(zbuffer.get(1, 1), Some(f32::INFINITY));

        zbuffer.resize(5, 1);
        assert_eq!(zbuffer.get(4, 0), Some(f32::INFINITY));
        assert_eq!(zbuffer.get(0, 1), None);
    }
}
