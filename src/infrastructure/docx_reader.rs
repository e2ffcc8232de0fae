//! DOCX 段落读取器 - 基础设施层
//!
//! DOCX = ZIP 包，正文在 `word/document.xml`，样式表在 `word/styles.xml`。
//! 只读取 `w:body` 直接子段落的文本与样式名，不解析表格、目录等内容控件与文本框。

use crate::error::{AppError, AppResult};
use crate::models::Paragraph;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;
use tracing::debug;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Word 内置样式在 styles.xml 中是小写名，这里映射为界面显示名
static BUILTIN_STYLE_NAMES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "caption" => "Caption",
    "footer" => "Footer",
    "header" => "Header",
    "heading 1" => "Heading 1",
    "heading 2" => "Heading 2",
    "heading 3" => "Heading 3",
    "heading 4" => "Heading 4",
    "heading 5" => "Heading 5",
    "heading 6" => "Heading 6",
    "heading 7" => "Heading 7",
    "heading 8" => "Heading 8",
    "heading 9" => "Heading 9",
    "normal" => "Normal",
    "title" => "Title",
    "subtitle" => "Subtitle",
};

/// 段落来源
///
/// 将文档解码为有序的段落序列
pub trait ParagraphSource: Send + Sync {
    fn load(&self, path: &Path) -> AppResult<Vec<Paragraph>>;
}

/// 基于 zip + quick-xml 的 DOCX 读取器
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxReader;

impl ParagraphSource for DocxReader {
    fn load(&self, path: &Path) -> AppResult<Vec<Paragraph>> {
        let path_str = path.display().to_string();
        let file = open_existing(path)?;

        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| AppError::decode_failed(&path_str, e))?;

        let styles = match archive.by_name(STYLES_PART) {
            Ok(part) => Some(
                parse_styles(BufReader::new(part))
                    .map_err(|e| AppError::decode_failed(&path_str, format!("styles.xml: {}", e)))?,
            ),
            Err(zip::result::ZipError::FileNotFound) => None,
            Err(e) => return Err(AppError::decode_failed(&path_str, e)),
        };

        let document = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| AppError::decode_failed(&path_str, format!("缺少 {}: {}", DOCUMENT_PART, e)))?;

        let paragraphs = parse_document(BufReader::new(document), styles.as_ref())
            .map_err(|e| AppError::decode_failed(&path_str, format!("document.xml: {}", e)))?;

        debug!("读取 {} 完成，共 {} 个段落", path_str, paragraphs.len());
        Ok(paragraphs)
    }
}

/// 读取纯文本报告，非 UTF-8 内容按有损方式转换
pub fn read_text(path: &Path) -> AppResult<String> {
    let mut file = open_existing(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

fn open_existing(path: &Path) -> AppResult<File> {
    let display = path.display().to_string();
    if !path.is_file() {
        return Err(AppError::not_found(display));
    }
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::not_found(display),
        _ => AppError::file_read_failed(display, e),
    })
}

/// 段落样式表：styleId → 样式名
#[derive(Debug, Default)]
pub struct StyleSheet {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleSheet {
    /// 解析段落的样式名
    ///
    /// 未指定或找不到样式 id 时使用默认段落样式
    pub fn resolve(&self, style_id: Option<&str>) -> Option<String> {
        style_id
            .and_then(|id| self.names.get(id))
            .or(self.default_paragraph.as_ref())
            .cloned()
    }
}

/// 只有精确的小写内置名才映射，自定义样式名保持原样
fn ui_style_name(raw: &str) -> String {
    BUILTIN_STYLE_NAMES
        .get(raw)
        .map(|name| name.to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn attr_value(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// 解析 `word/styles.xml` 中的段落样式
pub fn parse_styles<R: BufRead>(input: R) -> Result<StyleSheet, quick_xml::Error> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut sheet = StyleSheet::default();

    // 当前 <w:style> 的 (styleId, 是否默认)
    let mut current: Option<(String, bool)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.local_name().as_ref() == b"style" => {
                let is_paragraph = attr_value(e, b"type").as_deref() == Some("paragraph");
                current = match (is_paragraph, attr_value(e, b"styleId")) {
                    (true, Some(id)) => {
                        let is_default = matches!(
                            attr_value(e, b"default").as_deref(),
                            Some("1") | Some("true") | Some("on")
                        );
                        Some((id, is_default))
                    }
                    _ => None,
                };
            }
            Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"name" => {
                if let (Some((id, is_default)), Some(raw)) = (&current, attr_value(e, b"val")) {
                    let name = ui_style_name(&raw);
                    if *is_default {
                        sheet.default_paragraph = Some(name.clone());
                    }
                    sheet.names.insert(id.clone(), name);
                }
            }
            Event::End(ref e) if e.local_name().as_ref() == b"style" => {
                current = None;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheet)
}

/// 正在收集的顶层段落
struct OpenParagraph {
    /// 段落子元素在元素栈中的层级
    depth: usize,
    text: String,
    style_id: Option<String>,
}

/// 元素是否位于段落的直接 run 中（`w:p/w:r` 或 `w:p/w:hyperlink/w:r`）
///
/// 修订（`w:ins`）、域（`w:fldSimple`）和行内内容控件里的 run 不计入段落文本
fn in_direct_run(stack: &[Vec<u8>], depth: usize) -> bool {
    match stack.get(depth..) {
        Some([r]) => r.as_slice() == b"r",
        Some([link, r]) => link.as_slice() == b"hyperlink" && r.as_slice() == b"r",
        _ => false,
    }
}

/// 元素是否为段落属性 `w:pPr` 的直接子元素
fn in_properties(stack: &[Vec<u8>], depth: usize) -> bool {
    matches!(stack.get(depth..), Some([ppr]) if ppr.as_slice() == b"pPr")
}

/// 换行符：只有文本换行产生 `\n`，分页与分栏符不产生文本
fn break_text(e: &BytesStart) -> Option<char> {
    match attr_value(e, b"type").as_deref() {
        None | Some("textWrapping") => Some('\n'),
        _ => None,
    }
}

/// 解析 `word/document.xml` 的顶层段落
///
/// 只收集 `w:body` 的直接子段落。表格、内容控件（如目录）与文本框中的段落都会跳过。
///
/// # 参数
/// - `input`: document.xml 内容
/// - `styles`: 样式表，为 None 时（文档没有样式表）直接使用 styleId 作为样式名
///
/// # 返回
/// 按文档顺序排列的段落
pub fn parse_document<R: BufRead>(
    input: R,
    styles: Option<&StyleSheet>,
) -> Result<Vec<Paragraph>, quick_xml::Error> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();

    // 当前打开元素的本地名
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut in_text = false;
    let mut open: Option<OpenParagraph> = None;

    let finish = |text: String, style_id: Option<String>| {
        let style_name = match styles {
            Some(sheet) => sheet.resolve(style_id.as_deref()),
            None => style_id.as_deref().map(ui_style_name),
        };
        Paragraph::with_style(text, style_name.as_deref())
    };

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = e.local_name().as_ref().to_vec();
                let parent_is_body = stack.last().map(Vec::as_slice) == Some(b"body".as_slice());
                if let Some(p) = open.as_ref() {
                    in_text = name.as_slice() == b"t" && in_direct_run(&stack, p.depth);
                } else if name.as_slice() == b"p" && parent_is_body {
                    open = Some(OpenParagraph {
                        depth: stack.len() + 1,
                        text: String::new(),
                        style_id: None,
                    });
                }
                stack.push(name);
            }
            Event::Empty(ref e) => {
                let name = e.local_name();
                let parent_is_body = stack.last().map(Vec::as_slice) == Some(b"body".as_slice());
                match open.as_mut() {
                    None => {
                        if name.as_ref() == b"p" && parent_is_body {
                            paragraphs.push(finish(String::new(), None));
                        }
                    }
                    Some(p) if in_properties(&stack, p.depth) => {
                        if name.as_ref() == b"pStyle" {
                            p.style_id = attr_value(e, b"val");
                        }
                    }
                    Some(p) if in_direct_run(&stack, p.depth) => match name.as_ref() {
                        b"tab" | b"ptab" => p.text.push('\t'),
                        b"cr" => p.text.push('\n'),
                        b"br" => p.text.extend(break_text(e)),
                        b"noBreakHyphen" => p.text.push('-'),
                        _ => {}
                    },
                    Some(_) => {}
                }
            }
            Event::Text(ref e) => {
                if in_text {
                    if let Some(p) = open.as_mut() {
                        p.text.push_str(&e.unescape()?);
                    }
                }
            }
            Event::End(_) => {
                stack.pop();
                in_text = false;
                if open.as_ref().is_some_and(|p| stack.len() + 1 == p.depth) {
                    if let Some(p) = open.take() {
                        paragraphs.push(finish(p.text, p.style_id));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! 测试用的最小 DOCX 构造器

    use std::io::Write;
    use std::path::Path;
    use zip::write::SimpleFileOptions;

    pub const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
  <w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/></w:style>
  <w:style w:type="character" w:styleId="Strong"><w:name w:val="Strong"/></w:style>
</w:styles>"#;

    /// (文本, styleId) 列表 → document.xml
    pub fn document_xml(paragraphs: &[(&str, Option<&str>)]) -> String {
        let mut body = String::new();
        for (text, style) in paragraphs {
            body.push_str("<w:p>");
            if let Some(style) = style {
                body.push_str(&format!("<w:pPr><w:pStyle w:val=\"{}\"/></w:pPr>", style));
            }
            if !text.is_empty() {
                let escaped = text
                    .replace('&', "&amp;")
                    .replace('<', "&lt;")
                    .replace('>', "&gt;");
                body.push_str(&format!(
                    "<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>",
                    escaped
                ));
            }
            body.push_str("</w:p>");
        }
        wrap_body(&body)
    }

    pub fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            body
        )
    }

    /// 写出一个 DOCX 文件
    pub fn write_docx(path: &Path, document_xml: &str, styles_xml: Option<&str>) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        if let Some(styles) = styles_xml {
            zip.start_file("word/styles.xml", options).unwrap();
            zip.write_all(styles.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::error::DocumentError;

    fn parse(xml: &str, styles: Option<&str>) -> Vec<Paragraph> {
        let sheet = styles.map(|s| parse_styles(s.as_bytes()).unwrap());
        parse_document(xml.as_bytes(), sheet.as_ref()).unwrap()
    }

    #[test]
    fn test_styles_resolve_to_ui_names() {
        let sheet = parse_styles(STYLES_XML.as_bytes()).unwrap();
        assert_eq!(sheet.resolve(Some("Heading1")).as_deref(), Some("Heading 1"));
        assert_eq!(sheet.resolve(Some("Title")).as_deref(), Some("Title"));
        assert_eq!(sheet.resolve(None).as_deref(), Some("Normal"));
        // 字符样式不参与段落样式解析
        assert_eq!(sheet.resolve(Some("Strong")).as_deref(), Some("Normal"));
    }

    #[test]
    fn test_paragraph_text_and_heading_tags() {
        let xml = document_xml(&[
            ("Executive Summary", Some("Heading1")),
            ("Found critical issue A.", None),
            ("Report", Some("Title")),
        ]);
        let paragraphs = parse(&xml, Some(STYLES_XML));

        assert_eq!(
            paragraphs,
            vec![
                Paragraph::heading("Executive Summary", "Heading 1"),
                Paragraph::body("Found critical issue A."),
                Paragraph::body("Report"),
            ]
        );
    }

    #[test]
    fn test_runs_tabs_breaks_and_entities() {
        let xml = wrap_body(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
             <w:r><w:t>A &amp; B</w:t></w:r><w:r><w:tab/><w:t>C</w:t><w:br/><w:t>D</w:t></w:r></w:p>",
        );
        let paragraphs = parse(&xml, None);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text, "A & B\tC\nD");
    }

    #[test]
    fn test_empty_paragraphs_are_kept() {
        let xml = wrap_body("<w:p/><w:p></w:p><w:p><w:r><w:t>x</w:t></w:r></w:p>");
        let texts: Vec<_> = parse(&xml, None).into_iter().map(|p| p.text).collect();
        assert_eq!(texts, vec!["", "", "x"]);
    }

    #[test]
    fn test_table_paragraphs_are_skipped() {
        let xml = wrap_body(
            "<w:p><w:r><w:t>before</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Critical cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>after</w:t></w:r></w:p>",
        );
        let texts: Vec<_> = parse(&xml, None).into_iter().map(|p| p.text).collect();
        assert_eq!(texts, vec!["before", "after"]);
    }

    #[test]
    fn test_table_of_contents_is_skipped() {
        let xml = wrap_body(
            "<w:sdt><w:sdtPr><w:docPartObj><w:docPartGallery w:val=\"Table of Contents\"/></w:docPartObj></w:sdtPr>\
             <w:sdtContent>\
             <w:p><w:r><w:t>Table of Contents</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Executive Summary</w:t></w:r><w:r><w:tab/><w:t>3</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Scope</w:t></w:r><w:r><w:tab/><w:t>4</w:t></w:r></w:p>\
             </w:sdtContent></w:sdt>\
             <w:p><w:pPr><w:pStyle w:val=\"Heading1\"/></w:pPr><w:r><w:t>Executive Summary</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Found critical issue A.</w:t></w:r></w:p>\
             <w:p><w:pPr><w:pStyle w:val=\"Heading1\"/></w:pPr><w:r><w:t>Scope</w:t></w:r></w:p>",
        );
        let paragraphs = parse(&xml, Some(STYLES_XML));

        assert_eq!(
            paragraphs,
            vec![
                Paragraph::heading("Executive Summary", "Heading 1"),
                Paragraph::body("Found critical issue A."),
                Paragraph::heading("Scope", "Heading 1"),
            ]
        );
        assert_eq!(
            crate::services::summary_extractor::extract(&paragraphs),
            "Found critical issue A."
        );
    }

    #[test]
    fn test_custom_xml_and_text_box_paragraphs_are_skipped() {
        let xml = wrap_body(
            "<w:customXml w:element=\"finding\"><w:p><w:r><w:t>wrapped</w:t></w:r></w:p></w:customXml>\
             <w:p><w:r><w:t>outer</w:t></w:r><w:r><w:drawing><w:txbxContent>\
             <w:p><w:r><w:t>boxed</w:t></w:r></w:p>\
             </w:txbxContent></w:drawing></w:r></w:p>",
        );
        let texts: Vec<_> = parse(&xml, None).into_iter().map(|p| p.text).collect();
        assert_eq!(texts, vec!["outer"]);
    }

    #[test]
    fn test_only_direct_runs_and_hyperlinks_contribute_text() {
        let xml = wrap_body(
            "<w:p><w:r><w:t>See </w:t></w:r>\
             <w:hyperlink w:anchor=\"a\"><w:r><w:t>appendix</w:t></w:r></w:hyperlink>\
             <w:ins w:id=\"1\"><w:r><w:t> inserted</w:t></w:r></w:ins>\
             <w:fldSimple w:instr=\"PAGE\"><w:r><w:t>7</w:t></w:r></w:fldSimple>\
             <w:r><w:t>.</w:t></w:r></w:p>",
        );
        assert_eq!(parse(&xml, None)[0].text, "See appendix.");
    }

    #[test]
    fn test_page_break_adds_no_text() {
        let xml = wrap_body(
            "<w:p><w:r><w:t>end</w:t><w:br w:type=\"page\"/><w:t>next</w:t>\
             <w:br w:type=\"textWrapping\"/><w:t>line</w:t><w:noBreakHyphen/><w:t>x</w:t></w:r></w:p>",
        );
        assert_eq!(parse(&xml, None)[0].text, "endnext\nline-x");
    }

    #[test]
    fn test_custom_style_names_are_not_remapped() {
        let styles = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Shouting"><w:name w:val="HEADING 1"/></w:style>
</w:styles>"#;
        let sheet = parse_styles(styles.as_bytes()).unwrap();
        assert_eq!(sheet.resolve(Some("Shouting")).as_deref(), Some("HEADING 1"));

        let paragraphs = parse(&document_xml(&[("Loud", Some("Shouting"))]), Some(styles));
        assert!(!paragraphs[0].is_heading());
    }

    #[test]
    fn test_without_stylesheet_style_id_is_used() {
        let xml = document_xml(&[("Scope", Some("Heading2"))]);
        let paragraphs = parse(&xml, None);
        assert_eq!(paragraphs[0].heading_level.as_deref(), Some("Heading2"));
    }

    #[test]
    fn test_load_docx_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");
        write_docx(
            &path,
            &document_xml(&[("Conclusion", Some("Heading1")), ("Patch now.", None)]),
            Some(STYLES_XML),
        );

        let paragraphs = DocxReader.load(&path).unwrap();
        assert_eq!(paragraphs.len(), 2);
        assert!(paragraphs[0].is_heading());
        assert_eq!(paragraphs[1].text, "Patch now.");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocxReader.load(&dir.path().join("nope.docx")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_non_zip_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, "plain text, not a zip").unwrap();

        let err = DocxReader.load(&path).unwrap_err();
        assert!(matches!(
            err,
            AppError::Document(DocumentError::Decode { .. })
        ));
    }

    #[test]
    fn test_zip_without_document_part_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        {
            let file = std::fs::File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            zip.start_file("readme.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.finish().unwrap();
        }
        let err = DocxReader.load(&path).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn test_read_text_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"ok \xff end").unwrap();
        let text = read_text(&path).unwrap();
        assert!(text.starts_with("ok "));
        assert!(text.ends_with(" end"));
    }
}
