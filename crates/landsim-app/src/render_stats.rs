//! Headless drawing surface that only counts what it is asked to draw.

use landsim_sector::{DrawMode, RenderBackend};

/// Totals for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Mode the frame was drawn in.
    pub mode: DrawMode,
    /// Draw calls issued.
    pub draw_calls: usize,
    /// Triangles submitted.
    pub triangles: usize,
    /// Line segments submitted.
    pub segments: usize,
}

/// Render backend for runs without a window.
#[derive(Debug, Default)]
pub struct StatsBackend {
    current: FrameStats,
    frames: u64,
}

impl StatsBackend {
    /// Creates a backend with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ends the current frame and returns its totals.
    pub fn finish_frame(&mut self) -> FrameStats {
        self.frames += 1;
        std::mem::take(&mut self.current)
    }

    /// Totals accumulated since the last [`finish_frame`](Self::finish_frame).
    pub fn current(&self) -> &FrameStats {
        &self.current
    }

    /// Frames finished so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderBackend for StatsBackend {
    fn begin_mode(&mut self, mode: DrawMode) {
        self.current.mode = mode;
    }

    fn draw_triangles(&mut self, _vertices: &[[f32; 3]], _normals: &[[f32; 3]], indices: &[u32]) {
        self.current.draw_calls += 1;
        self.current.triangles += indices.len() / 3;
    }

    fn draw_lines(&mut self, points: &[[f32; 3]]) {
        self.current.draw_calls += 1;
        self.current.segments += points.len() / 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_frame_resets_counters() {
        let mut backend = StatsBackend::new();
        let p = [[0.0; 3]; 4];
        backend.begin_mode(DrawMode::Solid);
        backend.draw_triangles(&p, &p, &[0, 1, 2]);
        backend.draw_lines(&p);

        let stats = backend.finish_frame();
        assert_eq!(
            stats,
            FrameStats {
                mode: DrawMode::Solid,
                draw_calls: 2,
                triangles: 1,
                segments: 2,
            }
        );
        assert_eq!(*backend.current(), FrameStats::default());
        assert_eq!(backend.frames(), 1);
    }
}
