//! Preview surface
//!
//! The live preview is modelled as a surface whose content is replaced
//! atomically on every render. [`PreviewPane`] is an in-memory surface that
//! estimates layout from the number of rendered lines.

/// Something that displays rendered HTML
pub trait PreviewSurface {
    /// Replace the whole content in one step
    fn replace_content(&mut self, html: &str);

    /// Height of the current content
    fn content_height(&self) -> f32;

    /// Height of the visible area
    fn viewport_height(&self) -> f32;

    /// Scroll back to the top
    fn scroll_to_top(&mut self);
}

/// Default visible height of a pane
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 600.0;

/// Default height of one rendered line
pub const DEFAULT_LINE_HEIGHT: f32 = 24.0;

/// In-memory preview pane
#[derive(Debug, Clone)]
pub struct PreviewPane {
    html: String,
    scroll_top: f32,
    viewport_height: f32,
    line_height: f32,
    revision: u64,
}

impl PreviewPane {
    /// Create an empty pane with default metrics
    pub fn new() -> Self {
        Self::with_metrics(DEFAULT_VIEWPORT_HEIGHT, DEFAULT_LINE_HEIGHT)
    }

    /// Create an empty pane with explicit metrics
    pub fn with_metrics(viewport_height: f32, line_height: f32) -> Self {
        Self {
            html: String::new(),
            scroll_top: 0.0,
            viewport_height,
            line_height,
            revision: 0,
        }
    }

    /// Currently displayed HTML
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Current scroll offset
    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    /// Scroll to an offset, clamped to the content
    pub fn scroll_to(&mut self, offset: f32) {
        let max = (self.content_height() - self.viewport_height).max(0.0);
        self.scroll_top = offset.clamp(0.0, max);
    }

    /// Number of content replacements so far
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for PreviewPane {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSurface for PreviewPane {
    fn replace_content(&mut self, html: &str) {
        self.html = html.to_string();
        self.revision += 1;
    }

    fn content_height(&self) -> f32 {
        if self.html.is_empty() {
            return 0.0;
        }
        (self.html.lines().count() as f32) * self.line_height
    }

    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn scroll_to_top(&mut self) {
        self.scroll_top = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_content() {
        let mut pane = PreviewPane::new();
        pane.replace_content("<h1>a</h1>");
        pane.replace_content("<h1>b</h1>");
        assert_eq!(pane.html(), "<h1>b</h1>");
        assert_eq!(pane.revision(), 2);
    }

    #[test]
    fn test_content_height_from_lines() {
        let mut pane = PreviewPane::with_metrics(100.0, 10.0);
        pane.replace_content("a\nb\nc");
        assert_eq!(pane.content_height(), 30.0);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut pane = PreviewPane::with_metrics(20.0, 10.0);
        pane.replace_content("1\n2\n3\n4\n5");
        pane.scroll_to(500.0);
        assert_eq!(pane.scroll_top(), 30.0);
        pane.scroll_to_top();
        assert_eq!(pane.scroll_top(), 0.0);
    }
}
