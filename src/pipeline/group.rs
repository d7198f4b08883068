//! Paragraph grouping: consecutive [`Line`]s → [`Paragraph`]s.
//!
//! A line continues the current paragraph only if it has exactly the same
//! style, sits on the same page, and its vertical position is strictly less
//! than `gap` away from the previous line's. Anything else closes the
//! paragraph. Output order is input order.

use crate::model::{Line, Paragraph, ParagraphStyle};

struct Accumulator {
    text: String,
    style: ParagraphStyle,
    page: usize,
    last_y: f32,
}

impl Accumulator {
    fn start(line: &Line) -> Self {
        Self {
            text: line.text.clone(),
            style: line.style,
            page: line.page,
            last_y: line.vertical_position,
        }
    }

    fn continues_with(&self, line: &Line, gap: f32) -> bool {
        line.style == self.style
            && line.page == self.page
            && (line.vertical_position - self.last_y).abs() < gap
    }

    fn push(&mut self, line: &Line) {
        self.text.push(' ');
        self.text.push_str(&line.text);
        self.last_y = line.vertical_position;
    }

    fn finish(self, out: &mut Vec<Paragraph>) {
        let text = self.text.trim();
        if !text.is_empty() {
            out.push(Paragraph::new(text, self.style));
        }
    }
}

/// Merge lines into paragraphs using `gap` (points) as the exclusive
/// vertical-distance limit.
pub fn group_lines(lines: &[Line], gap: f32) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut current: Option<Accumulator> = None;

    for line in lines {
        match current.as_mut() {
            Some(acc) if acc.continues_with(line, gap) => acc.push(line),
            _ => {
                if let Some(done) = current.take() {
                    done.finish(&mut paragraphs);
                }
                current = Some(Accumulator::start(line));
            }
        }
    }

    if let Some(done) = current {
        done.finish(&mut paragraphs);
    }

    paragraphs
}
