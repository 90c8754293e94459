//! Interface to the drawing surface that consumes sector geometry.

/// How tiles are drawn this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawMode {
    /// Unlit edge lines.
    #[default]
    Wireframe,
    /// Lit triangles with per-vertex normals.
    Solid,
}

impl DrawMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Wireframe => Self::Solid,
            Self::Solid => Self::Wireframe,
        }
    }

    /// Upper-case label for status output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Wireframe => "WIREFRAME",
            Self::Solid => "SOLID",
        }
    }
}

/// A drawing surface.
///
/// Immediate mode: buffers are borrowed for the duration of the call only.
pub trait RenderBackend {
    /// Switches global shading state (lighting on for solid, off for
    /// wireframe). Called once per frame, not per tile.
    fn begin_mode(&mut self, mode: DrawMode);

    /// Draws an indexed triangle list with per-vertex normals.
    fn draw_triangles(&mut self, vertices: &[[f32; 3]], normals: &[[f32; 3]], indices: &[u32]);

    /// Draws a line list: each consecutive pair of points is one segment.
    fn draw_lines(&mut self, points: &[[f32; 3]]);
}

/// One call received by a [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    /// [`RenderBackend::begin_mode`].
    Mode(DrawMode),
    /// [`RenderBackend::draw_triangles`].
    Triangles {
        /// Vertices supplied.
        vertex_count: usize,
        /// Indices supplied.
        index_count: usize,
    },
    /// [`RenderBackend::draw_lines`].
    Lines {
        /// Points supplied (two per segment).
        point_count: usize,
    },
}

/// Backend that records calls instead of drawing. Useful for tests and for
/// frame statistics in headless runs.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Calls in the order they were received.
    pub calls: Vec<DrawCall>,
}

impl RecordingBackend {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total triangles drawn.
    pub fn triangle_count(&self) -> usize {
        self.calls
            .iter()
            .map(|call| match call {
                DrawCall::Triangles { index_count, .. } => index_count / 3,
                _ => 0,
            })
            .sum()
    }

    /// Total line segments drawn.
    pub fn segment_count(&self) -> usize {
        self.calls
            .iter()
            .map(|call| match call {
                DrawCall::Lines { point_count } => point_count / 2,
                _ => 0,
            })
            .sum()
    }

    /// Forgets all recorded calls.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn begin_mode(&mut self, mode: DrawMode) {
        self.calls.push(DrawCall::Mode(mode));
    }

    fn draw_triangles(&mut self, vertices: &[[f32; 3]], _normals: &[[f32; 3]], indices: &[u32]) {
        self.calls.push(DrawCall::Triangles {
            vertex_count: vertices.len(),
            index_count: indices.len(),
        });
    }

    fn draw_lines(&mut self, points: &[[f32; 3]]) {
        self.calls.push(DrawCall::Lines {
            point_count: points.len(),
        });
    }
}
