//! Converts generated Markdown-subset text into a `.docx` document.
//!
//! Only three constructs are recognised, each on a line of its own: `**Heading**`,
//! `- bullet` and plain text. Anything else degrades to a plain paragraph.

mod docx;

pub use docx::{write_document, DocxError};

use serde::{Deserialize, Serialize};

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const FALLBACK_TEXT: &str = "No descriptions available.";
pub const DEFAULT_FONT: &str = "Calibri";
pub const DEFAULT_FONT_SIZE_PT: u32 = 11;
pub const HEADING_FONT_SIZE_PT: u32 = 14;

const BOLD_MARKER: &str = "**";
const BULLET_PREFIX: &str = "- ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockRole {
    Primary,
    Secondary,
}

/// One generated description to place in the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptionBlock {
    pub text: String,
    pub role: BlockRole,
}

impl DescriptionBlock {
    pub fn primary(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: BlockRole::Primary,
        }
    }

    pub fn secondary(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: BlockRole::Secondary,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Heading(&'a str),
    Bullet(&'a str),
    Paragraph(&'a str),
}

/// Classifies a single line, looking at nothing but its trimmed text.
///
/// The heading check runs first, so `**- Note**` is a heading whose text is `- Note`.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    let markers = BOLD_MARKER.len();
    if line.len() >= markers * 2 && line.starts_with(BOLD_MARKER) && line.ends_with(BOLD_MARKER) {
        return LineKind::Heading(line[markers..line.len() - markers].trim());
    }

    if let Some(rest) = line.strip_prefix(BULLET_PREFIX) {
        return LineKind::Bullet(rest.trim());
    }

    LineKind::Paragraph(line)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParagraphStyle {
    Normal,
    ListBullet,
}

impl ParagraphStyle {
    pub fn style_id(self) -> &'static str {
        match self {
            ParagraphStyle::Normal => "Normal",
            ParagraphStyle::ListBullet => "ListBullet",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub style: ParagraphStyle,
    pub bold: bool,
    /// Overrides the default font size when set.
    pub size_pt: Option<u32>,
}

impl Paragraph {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: ParagraphStyle::Normal,
            bold: false,
            size_pt: None,
        }
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: ParagraphStyle::Normal,
            bold: true,
            size_pt: Some(HEADING_FONT_SIZE_PT),
        }
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: ParagraphStyle::ListBullet,
            bold: false,
            size_pt: None,
        }
    }
}

/// Joins the non-empty blocks, primary ones first, with one blank line between them.
pub fn combine_blocks(blocks: &[DescriptionBlock]) -> String {
    let mut ordered: Vec<&DescriptionBlock> = blocks
        .iter()
        .filter(|block| !block.text.trim().is_empty())
        .collect();
    ordered.sort_by_key(|block| block.role);

    ordered
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_paragraphs(blocks: &[DescriptionBlock]) -> Vec<Paragraph> {
    let combined = combine_blocks(blocks);
    if combined.is_empty() {
        return vec![Paragraph::plain(FALLBACK_TEXT)];
    }

    combined
        .lines()
        .filter_map(|line| match classify_line(line) {
            LineKind::Blank => None,
            LineKind::Heading(text) => Some(Paragraph::heading(text)),
            LineKind::Bullet(text) => Some(Paragraph::bullet(text)),
            LineKind::Paragraph(text) => Some(Paragraph::plain(text)),
        })
        .collect()
}

/// Renders the blocks into a complete `.docx` file held in memory.
pub fn render(blocks: &[DescriptionBlock]) -> Result<Vec<u8>, DocxError> {
    write_document(&build_paragraphs(blocks))
}

/// `{secondary}_{primary}_description.docx`
pub fn export_filename(secondary_name: &str, primary_name: &str) -> String {
    format!("{}_{}_description.docx", secondary_name, primary_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_heading() {
        assert_eq!(classify_line("**Economy**"), LineKind::Heading("Economy"));
        assert_eq!(classify_line("  ** Economy **  "), LineKind::Heading("Economy"));
        assert_eq!(classify_line("****"), LineKind::Heading(""));
        assert_eq!(classify_line("**- Note**"), LineKind::Heading("- Note"));
    }

    #[test]
    fn test_classify_overlapping_markers_is_paragraph() {
        assert_eq!(classify_line("***"), LineKind::Paragraph("***"));
        assert_eq!(classify_line("**"), LineKind::Paragraph("**"));
    }

    #[test]
    fn test_classify_bullet() {
        assert_eq!(
            classify_line("- Top schools include X"),
            LineKind::Bullet("Top schools include X")
        );
        assert_eq!(classify_line("   -   spaced  "), LineKind::Bullet("spaced"));
        assert_eq!(classify_line("-no space"), LineKind::Paragraph("-no space"));
        assert_eq!(classify_line("- **bold inside**"), LineKind::Bullet("**bold inside**"));
    }

    #[test]
    fn test_classify_blank_and_plain() {
        assert_eq!(classify_line(""), LineKind::Blank);
        assert_eq!(classify_line(" \t "), LineKind::Blank);
        assert_eq!(
            classify_line("Gurgaon is a city in Haryana."),
            LineKind::Paragraph("Gurgaon is a city in Haryana.")
        );
        assert_eq!(
            classify_line("**Bold** then text"),
            LineKind::Paragraph("**Bold** then text")
        );
    }

    #[test]
    fn test_empty_blocks_fall_back() {
        assert_eq!(build_paragraphs(&[]), vec![Paragraph::plain(FALLBACK_TEXT)]);
        assert_eq!(
            build_paragraphs(&[DescriptionBlock::primary(""), DescriptionBlock::secondary("")]),
            vec![Paragraph::plain(FALLBACK_TEXT)]
        );
    }

    #[test]
    fn test_heading_and_bullet_paragraphs() {
        let paragraphs = build_paragraphs(&[DescriptionBlock::primary(
            "**Economy**\n- Top schools include X\nPlain text.",
        )]);
        assert_eq!(
            paragraphs,
            vec![
                Paragraph::heading("Economy"),
                Paragraph::bullet("Top schools include X"),
                Paragraph::plain("Plain text."),
            ]
        );
        assert!(paragraphs[0].bold);
        assert_eq!(paragraphs[0].size_pt, Some(14));
        assert!(!paragraphs[1].bold);
        assert_eq!(paragraphs[1].style, ParagraphStyle::ListBullet);
    }

    #[test]
    fn test_blank_lines_produce_nothing() {
        let paragraphs =
            build_paragraphs(&[DescriptionBlock::primary("First\n\n   \n\t\nSecond\r\n")]);
        assert_eq!(
            paragraphs,
            vec![Paragraph::plain("First"), Paragraph::plain("Second")]
        );
    }

    #[test]
    fn test_blocks_joined_primary_first() {
        let blocks = [
            DescriptionBlock::secondary("**Golf Course Road**"),
            DescriptionBlock::primary("**Gurgaon**"),
        ];
        assert_eq!(combine_blocks(&blocks), "**Gurgaon**\n\n**Golf Course Road**");
        assert_eq!(
            build_paragraphs(&blocks),
            vec![
                Paragraph::heading("Gurgaon"),
                Paragraph::heading("Golf Course Road")
            ]
        );
    }

    #[test]
    fn test_single_non_empty_block_used_alone() {
        let blocks = [
            DescriptionBlock::primary(""),
            DescriptionBlock::secondary("- Only bullet"),
        ];
        assert_eq!(combine_blocks(&blocks), "- Only bullet");
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("Golf Course Road", "Gurgaon"),
            "Golf Course Road_Gurgaon_description.docx"
        );
    }
}
