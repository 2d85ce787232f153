//! PDF rendering of a consultation report.
//!
//! Rendering happens in two steps: [`layout`] turns a [`Report`] into styled,
//! wrapped lines, then [`ReportRenderer::render`] places those lines on A4
//! pages using the PDF built-in fonts.

use crate::domain::model::Report;
use crate::utils::error::{CropError, Result};
use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LAYER_NAME: &str = "Layer 1";

/// Points to millimetres.
const PT_TO_MM: f32 = 0.3528;

pub const USER_INPUT_HEADING: &str = "User Input:";
pub const MATCH_DATA_HEADING: &str = "Matching Crops/Data:";
pub const ADVICE_HEADING: &str = "AI Suggestion:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Heading,
    Body,
    Mono,
    Footer,
}

impl TextStyle {
    fn font_size(self) -> f32 {
        match self {
            TextStyle::Title => 16.0,
            TextStyle::Heading | TextStyle::Body => 12.0,
            TextStyle::Mono => 9.0,
            TextStyle::Footer => 8.0,
        }
    }

    fn line_height(self) -> f32 {
        match self {
            TextStyle::Title => 10.0,
            TextStyle::Heading => 9.0,
            TextStyle::Body => 7.0,
            TextStyle::Mono => 5.0,
            TextStyle::Footer => 5.0,
        }
    }

    /// Rough glyph width in mm, used for wrapping and centring.
    fn char_width(self) -> f32 {
        let em = match self {
            TextStyle::Mono => 0.6,
            _ => 0.5,
        };
        self.font_size() * em * PT_TO_MM
    }

    fn max_chars(self) -> usize {
        ((PAGE_WIDTH - 2.0 * MARGIN) / self.char_width()).floor() as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutItem {
    Line(TextStyle, String),
    Gap(f32),
}

/// Lays out the report sections. The match data section is omitted when empty.
pub fn layout(report: &Report, generated_at: Option<DateTime<Utc>>) -> Vec<LayoutItem> {
    let mut items = vec![LayoutItem::Line(TextStyle::Title, sanitize(&report.title))];
    items.push(LayoutItem::Gap(10.0));

    push_section(&mut items, USER_INPUT_HEADING, &report.user_input, TextStyle::Body);

    if let Some(match_data) = report.match_data.as_deref().filter(|m| !m.trim().is_empty()) {
        items.push(LayoutItem::Gap(5.0));
        push_section(&mut items, MATCH_DATA_HEADING, match_data, TextStyle::Mono);
    }

    items.push(LayoutItem::Gap(5.0));
    push_section(&mut items, ADVICE_HEADING, &report.advice, TextStyle::Body);

    if let Some(ts) = generated_at {
        items.push(LayoutItem::Gap(8.0));
        items.push(LayoutItem::Line(
            TextStyle::Footer,
            format!("Generated {}", ts.format("%Y-%m-%d %H:%M UTC")),
        ));
    }

    items
}

fn push_section(items: &mut Vec<LayoutItem>, heading: &str, text: &str, style: TextStyle) {
    items.push(LayoutItem::Line(TextStyle::Heading, heading.to_string()));
    for line in text.lines() {
        for wrapped in wrap(&sanitize(line), style.max_chars()) {
            items.push(LayoutItem::Line(style, wrapped));
        }
    }
}

/// Word wrap to `width` characters; words longer than a line are split.
pub fn wrap(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let trimmed = line.trim_end();
    if trimmed.chars().count() <= width {
        return vec![trimmed.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in trimmed.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Restricts text to what the built-in PDF fonts can show.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c),
            '\t' => out.push_str("    "),
            '°' => out.push_str(" deg"),
            '‘' | '’' => out.push('\''),
            '“' | '”' => out.push('"'),
            '–' | '—' | '−' => out.push('-'),
            '•' => out.push('*'),
            '…' => out.push_str("..."),
            '\u{a0}' => out.push(' '),
            _ if c.is_control() => {}
            _ => out.push('?'),
        }
    }
    out
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    mono: IndirectFontRef,
}

impl Fonts {
    fn for_style(&self, style: TextStyle) -> &IndirectFontRef {
        match style {
            TextStyle::Title | TextStyle::Heading => &self.bold,
            TextStyle::Mono => &self.mono,
            TextStyle::Body | TextStyle::Footer => &self.regular,
        }
    }
}

fn pdf_error(e: printpdf::Error) -> CropError {
    CropError::ReportError {
        message: e.to_string(),
    }
}

/// What the "Generated" footer shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Stamp {
    #[default]
    Off,
    RenderTime,
    At(DateTime<Utc>),
}

#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    stamp: Stamp,
}

impl ReportRenderer {
    /// Renderer that stamps each report with the time it is rendered.
    pub fn new() -> Self {
        Self {
            stamp: Stamp::RenderTime,
        }
    }

    /// Fixed footer time, or no footer for `None`.
    pub fn with_timestamp(generated_at: Option<DateTime<Utc>>) -> Self {
        Self {
            stamp: generated_at.map_or(Stamp::Off, Stamp::At),
        }
    }

    fn footer_time(&self) -> Option<DateTime<Utc>> {
        match self.stamp {
            Stamp::Off => None,
            Stamp::RenderTime => Some(Utc::now()),
            Stamp::At(ts) => Some(ts),
        }
    }

    pub fn render(&self, report: &Report) -> Result<Vec<u8>> {
        let items = layout(report, self.footer_time());
        let title = sanitize(&report.title);

        let (doc, page, layer) =
            PdfDocument::new(title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
            mono: doc.add_builtin_font(BuiltinFont::Courier).map_err(pdf_error)?,
        };

        let mut current: PdfLayerReference = doc.get_page(page).get_layer(layer);
        let mut pages = 1;
        let mut y = PAGE_HEIGHT - MARGIN;

        for item in &items {
            match item {
                LayoutItem::Gap(height) => y -= height,
                LayoutItem::Line(style, text) => {
                    let height = style.line_height();
                    if y - height < MARGIN {
                        let (next_page, next_layer) =
                            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
                        current = doc.get_page(next_page).get_layer(next_layer);
                        pages += 1;
                        y = PAGE_HEIGHT - MARGIN;
                    }
                    y -= height;

                    if text.is_empty() {
                        continue;
                    }
                    let x = if *style == TextStyle::Title {
                        let width = text.chars().count() as f32 * style.char_width();
                        ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
                    } else {
                        MARGIN
                    };
                    current.use_text(
                        text.as_str(),
                        style.font_size(),
                        Mm(x),
                        Mm(y),
                        fonts.for_style(*style),
                    );
                }
            }
        }

        tracing::debug!("Rendered report '{}' ({} lines, {} pages)", title, items.len(), pages);
        doc.save_to_bytes().map_err(pdf_error)
    }
}
