/// Anything that can show the calculator's current text
pub trait DisplaySurface {
    fn set_text(&mut self, text: &str);
}

/// Text buffer read by the terminal renderer.
///
/// `revision` increases on every write so the render loop can tell whether a
/// redraw is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayBuffer {
    text: String,
    revision: u64,
}

impl DisplayBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl DisplaySurface for DisplayBuffer {
    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Surface that keeps every frame it was sent, for tests and headless drivers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSurface {
    pub frames: Vec<String>,
}

impl RecordingSurface {
    pub fn last(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }
}

impl DisplaySurface for RecordingSurface {
    fn set_text(&mut self, text: &str) {
        self.frames.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_tracks_revisions() {
        let mut buf = DisplayBuffer::default();
        assert_eq!(buf.revision(), 0);
        buf.set_text("12");
        buf.set_text("12+");
        assert_eq!(buf.text(), "12+");
        assert_eq!(buf.revision(), 2);
    }

    #[test]
    fn recording_surface_keeps_frames() {
        let mut rec = RecordingSurface::default();
        assert_eq!(rec.last(), None);
        rec.set_text("0");
        rec.set_text("7");
        assert_eq!(rec.frames, vec!["0", "7"]);
        assert_eq!(rec.last(), Some("7"));
    }
}
