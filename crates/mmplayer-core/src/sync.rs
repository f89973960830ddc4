//! Caption synchronization
//!
//! Called on every position tick: clears the caption area and appends every
//! caption visible at the current position, in track order.

use crate::captions::Caption;

/// Display surface for the active captions
pub trait CaptionArea {
    /// Remove all rendered captions
    fn clear(&mut self);

    /// Append one caption's markup
    fn append(&mut self, markup: &str);
}

/// Captions active at `position`, in track order
pub fn active_captions(captions: &[Caption], position: f64) -> impl Iterator<Item = &Caption> {
    captions.iter().filter(move |c| c.is_active_at(position))
}

/// Re-render `area` for the given playback position
pub fn render(area: &mut dyn CaptionArea, position: f64, captions: &[Caption]) {
    area.clear();
    for caption in active_captions(captions, position) {
        area.append(caption.text());
    }
}

/// In-memory caption area; each line is one `<div>`-wrapped caption
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionLines {
    lines: Vec<String>,
}

impl CaptionLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered captions, one entry per caption
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Markup as the overlay would hold it
    pub fn to_html(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("<div>{}</div>", line))
            .collect()
    }
}

impl CaptionArea for CaptionLines {
    fn clear(&mut self) {
        self.lines.clear();
    }

    fn append(&mut self, markup: &str) {
        self.lines.push(markup.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Vec<Caption> {
        vec![
            Caption::new("first", 1.0, 3.0).unwrap(),
            Caption::new("second", 5.0, 7.0).unwrap(),
        ]
    }

    fn rendered(position: f64) -> Vec<String> {
        let mut area = CaptionLines::new();
        render(&mut area, position, &track());
        area.lines().to_vec()
    }

    #[test]
    fn test_render_positions() {
        assert_eq!(rendered(2.0), vec!["first"]);
        assert!(rendered(4.0).is_empty());
        assert_eq!(rendered(3.0), vec!["first"]);
        assert_eq!(rendered(7.0), vec!["second"]);
        assert!(rendered(0.0).is_empty());
    }

    #[test]
    fn test_render_clears_previous() {
        let mut area = CaptionLines::new();
        render(&mut area, 2.0, &track());
        render(&mut area, 6.0, &track());
        assert_eq!(area.lines(), ["second".to_string()]);
    }

    #[test]
    fn test_overlapping_in_track_order() {
        let captions = vec![
            Caption::new("b", 2.0, 4.0).unwrap(),
            Caption::new("a", 1.0, 5.0).unwrap(),
        ];
        let mut area = CaptionLines::new();
        render(&mut area, 3.0, &captions);
        assert_eq!(area.to_html(), "<div>b</div><div>a</div>");
    }
}
