use budget::{Report, ReportLine};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 5.2;
/// Helvetica at 10pt fits roughly this many characters between the margins
const WRAP_AT: usize = 92;

struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> anyhow::Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow::anyhow!("Failed to load Helvetica: {}", e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow::anyhow!("Failed to load Helvetica-Bold: {}", e))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.new_page();
        }
    }

    fn write(&mut self, text: &str, size: f32, bold: bool, indent: f32) {
        let height = LINE_HEIGHT * size / BODY_SIZE;
        for chunk in wrap(text, WRAP_AT) {
            self.ensure_room(height);
            let font = if bold { &self.bold } else { &self.regular };
            self.layer
                .use_text(chunk, size, Mm(MARGIN + indent), Mm(self.y), font);
            self.y -= height;
        }
    }

    fn skip(&mut self, height: f32) {
        self.y -= height;
    }

    fn finish(self) -> anyhow::Result<(Vec<u8>, usize)> {
        let pages = self.pages;
        let bytes = self
            .doc
            .save_to_bytes()
            .map_err(|e| anyhow::anyhow!("Failed to serialize PDF: {}", e))?;
        Ok((bytes, pages))
    }
}

/// Split on whitespace so that no line exceeds `width` characters
/// (single words longer than that are kept whole).
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lay a report out on A4 pages, starting a new page whenever the current one is full.
pub fn render_report(report: &Report) -> anyhow::Result<Vec<u8>> {
    let (bytes, pages) = render_with_page_count(report)?;
    tracing::debug!("Rendered \"{}\" on {} page(s)", report.title, pages);
    Ok(bytes)
}

fn render_with_page_count(report: &Report) -> anyhow::Result<(Vec<u8>, usize)> {
    let mut writer = PageWriter::new(&report.title)?;

    writer.write(&report.title, 16.0, true, 0.0);
    if let Some(subtitle) = &report.subtitle {
        writer.write(subtitle, BODY_SIZE, false, 0.0);
    }
    writer.skip(LINE_HEIGHT);

    for section in &report.sections {
        // Keep a heading together with at least its first line
        writer.ensure_room(LINE_HEIGHT * 3.0);
        writer.write(&section.heading, 12.5, true, 0.0);

        for line in &section.lines {
            match line {
                ReportLine::Blank => writer.skip(LINE_HEIGHT / 2.0),
                ReportLine::Subheading(text) => writer.write(text, BODY_SIZE + 0.5, true, 0.0),
                ReportLine::Bullet(_) => writer.write(&line.render(), BODY_SIZE, false, 4.0),
                ReportLine::Text(_) | ReportLine::Field { .. } => {
                    writer.write(&line.render(), BODY_SIZE, false, 0.0)
                }
            }
        }
        writer.skip(LINE_HEIGHT / 2.0);
    }

    writer.skip(LINE_HEIGHT);
    writer.write(&report.footer, 8.0, false, 0.0);

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget::ReportSection;

    fn report(lines: usize) -> Report {
        Report {
            title: "Dossier de demande d'accompagnement".to_string(),
            subtitle: Some("Créé le 01/02/2024".to_string()),
            sections: vec![ReportSection {
                heading: "1. Identité".to_string(),
                lines: (0..lines)
                    .map(|i| ReportLine::Field {
                        label: format!("Ligne {i}"),
                        value: "valeur".to_string(),
                    })
                    .collect(),
            }],
            footer: "Dossier abc".to_string(),
        }
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("", 10), vec![String::new()]);
        assert_eq!(wrap("un deux trois", 7), vec!["un deux", "trois"]);
        assert_eq!(wrap("anticonstitutionnellement", 5).len(), 1);
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_report(&report(5)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_report_is_paginated() {
        let (_, pages) = render_with_page_count(&report(10)).unwrap();
        assert_eq!(pages, 1);

        let (bytes, pages) = render_with_page_count(&report(200)).unwrap();
        assert!(pages >= 3);
        assert!(bytes.starts_with(b"%PDF"));
    }
}
