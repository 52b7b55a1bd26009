//! Heading/body section splitting and section-kind routing

use super::normalize::is_divider;

/// A heading line plus the body lines that follow it.
///
/// Only ever emitted with a non-empty heading and at least one body line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading text with its trailing colon retained
    pub heading: String,
    pub body: Vec<String>,
}

/// Sections of the status report the parser knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// `Интернет шлюз:` key/value block
    Gateway,
    /// `Тоннель:` key/value block
    Tunnel,
    /// `Конфигурация...:` embedded object literal
    Config,
    /// `Доступные для тоннеля сети:` four-column table
    AvailableNetworks,
    /// `Полученные сканированием сети:` three- or four-column table
    ScannedNetworks,
}

impl SectionKind {
    /// Heading fragments in precedence order. Matching is by substring since
    /// headings carry surrounding label text.
    const MARKERS: [(&'static str, SectionKind); 5] = [
        ("Интернет шлюз", SectionKind::Gateway),
        ("Тоннель", SectionKind::Tunnel),
        ("Конфигурация", SectionKind::Config),
        ("Доступные", SectionKind::AvailableNetworks),
        ("Полученные", SectionKind::ScannedNetworks),
    ];

    pub fn classify(heading: &str) -> Option<Self> {
        Self::MARKERS
            .iter()
            .find(|(marker, _)| heading.contains(marker))
            .map(|(_, kind)| *kind)
    }
}

/// Accumulator for the section currently being read
#[derive(Default)]
struct Splitter {
    sections: Vec<Section>,
    heading: Option<String>,
    body: Vec<String>,
}

impl Splitter {
    /// Emit the pending section if it has a body; always leaves no heading
    fn flush(&mut self) {
        let body = std::mem::take(&mut self.body);
        if let Some(heading) = self.heading.take() {
            if body.is_empty() {
                tracing::debug!("Dropping empty section: {}", heading);
            } else {
                self.sections.push(Section { heading, body });
            }
        }
    }

    fn feed(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        if is_divider(trimmed) {
            self.flush();
        } else if trimmed.ends_with(':') {
            self.flush();
            self.heading = Some(trimmed.to_string());
        } else if self.heading.is_some() {
            self.body.push(trimmed.to_string());
        }
    }

    fn finish(mut self) -> Vec<Section> {
        self.flush();
        self.sections
    }
}

/// Partition normalized text into sections, in input order.
///
/// Body lines seen before the first heading are discarded.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut splitter = Splitter::default();
    for line in text.lines() {
        splitter.feed(line);
    }
    splitter.finish()
}
