//! 描画レイヤーから埋め込み画像とアンカー位置を取り出す
//!
//! xlsx の画像はセル値ではなく描画パーツにあるため、zip を直接開いて
//! workbook.xml → シート → drawing → media の関連付けを辿る。
//!
//! ```text
//! xl/workbook.xml                 先頭 <sheet r:id>
//! xl/_rels/workbook.xml.rels      r:id → xl/worksheets/sheetN.xml
//! xl/worksheets/_rels/*.rels      Type=.../drawing → xl/drawings/drawingN.xml
//! xl/drawings/drawingN.xml        アンカー(from col/row) + a:blip r:embed
//! xl/drawings/_rels/*.rels        r:embed → xl/media/imageN.png
//! ```

use crate::error::{CropReportError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const DRAWING_REL_SUFFIX: &str = "/drawing";

/// アンカー付きの埋め込み画像
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// 左上セルの行（0始まり）
    pub row: u32,
    /// 左上セルの列（0始まり）
    pub col: u32,
    /// zip内のパス（xl/media/image1.png など）
    pub media_path: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Relationship {
    pub id: String,
    pub target: String,
    pub rel_type: String,
}

/// 描画内のアンカー（画像本体はまだ読まない）
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Anchor {
    pub row: u32,
    pub col: u32,
    pub embed: String,
}

/// 先頭シートの埋め込み画像を描画順に返す
///
/// 描画パーツが無いシートは空。個々の画像の読み込み失敗は警告して飛ばす。
pub fn read_embedded_images(path: &Path) -> Result<Vec<EmbeddedImage>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| CropReportError::Drawing(format!("{}: {}", path.display(), e)))?;

    let workbook_xml = read_part(&mut archive, WORKBOOK_PART)?;
    let Some(sheet_rid) = first_sheet_rel_id(&workbook_xml) else {
        return Ok(Vec::new());
    };

    let workbook_rels = read_part(&mut archive, &rels_path_for(WORKBOOK_PART))?;
    let Some(sheet_rel) = parse_relationships(&workbook_rels)
        .into_iter()
        .find(|r| r.id == sheet_rid)
    else {
        return Err(CropReportError::Drawing(format!(
            "シートの関連付けが見つかりません: {}",
            sheet_rid
        )));
    };
    let sheet_part = resolve_part_path(WORKBOOK_PART, &sheet_rel.target);

    let Ok(sheet_rels) = read_part(&mut archive, &rels_path_for(&sheet_part)) else {
        debug!("{} に関連付けがありません", sheet_part);
        return Ok(Vec::new());
    };
    let Some(drawing_rel) = parse_relationships(&sheet_rels)
        .into_iter()
        .find(|r| r.rel_type.ends_with(DRAWING_REL_SUFFIX))
    else {
        debug!("{} に描画パーツがありません", sheet_part);
        return Ok(Vec::new());
    };
    let drawing_part = resolve_part_path(&sheet_part, &drawing_rel.target);

    let drawing_xml = read_part(&mut archive, &drawing_part)?;
    let anchors = parse_anchors(&drawing_xml);
    if anchors.is_empty() {
        return Ok(Vec::new());
    }

    let media: HashMap<String, String> = match read_part(&mut archive, &rels_path_for(&drawing_part)) {
        Ok(xml) => parse_relationships(&xml)
            .into_iter()
            .map(|r| (r.id, resolve_part_path(&drawing_part, &r.target)))
            .collect(),
        Err(e) => {
            warn!("{} の関連付けを読めません: {}", drawing_part, e);
            return Ok(Vec::new());
        }
    };

    let mut images = Vec::new();
    for anchor in anchors {
        let Some(media_path) = media.get(&anchor.embed) else {
            warn!("画像の参照先がありません: {}", anchor.embed);
            continue;
        };
        match read_part_bytes(&mut archive, media_path) {
            Ok(data) => images.push(EmbeddedImage {
                row: anchor.row,
                col: anchor.col,
                media_path: media_path.clone(),
                data,
            }),
            Err(e) => warn!("画像を読めません {}: {}", media_path, e),
        }
    }

    debug!("{} 件の埋め込み画像 ({})", images.len(), drawing_part);
    Ok(images)
}

fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Result<String> {
    let bytes = read_part_bytes(archive, name)?;
    String::from_utf8(bytes).map_err(|e| CropReportError::Drawing(format!("{}: {}", name, e)))
}

fn read_part_bytes(archive: &mut ZipArchive<File>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| CropReportError::Drawing(format!("{}: {}", name, e)))?;
    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Ok(data)
}

/// `xl/worksheets/sheet1.xml` → `xl/worksheets/_rels/sheet1.xml.rels`
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// 関連付けのターゲットをパーツ基準で解決
pub(crate) fn resolve_part_path(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

fn attribute(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == local)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn first_sheet_rel_id(workbook_xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                return attribute(&e, b"id");
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

pub(crate) fn parse_relationships(xml: &str) -> Vec<Relationship> {
    let mut relationships = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    if let (Some(id), Some(target)) = (attribute(&e, b"Id"), attribute(&e, b"Target")) {
                        relationships.push(Relationship {
                            id,
                            target,
                            rel_type: attribute(&e, b"Type").unwrap_or_default(),
                        });
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    relationships
}

#[derive(Clone, Copy, PartialEq)]
enum Coord {
    None,
    Col,
    Row,
}

/// twoCellAnchor / oneCellAnchor の左上セルと画像参照
///
/// absoluteAnchor はセル位置を持たないので対象外。
pub(crate) fn parse_anchors(xml: &str) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut in_anchor = false;
    let mut in_from = false;
    let mut coord = Coord::None;
    let mut row: Option<u32> = None;
    let mut col: Option<u32> = None;
    let mut embed: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"twoCellAnchor" | b"oneCellAnchor" => {
                    in_anchor = true;
                    row = None;
                    col = None;
                    embed = None;
                }
                b"from" if in_anchor => in_from = true,
                b"col" if in_from => coord = Coord::Col,
                b"row" if in_from => coord = Coord::Row,
                b"blip" if in_anchor && embed.is_none() => embed = attribute(&e, b"embed"),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"blip" && in_anchor && embed.is_none() {
                    embed = attribute(&e, b"embed");
                }
            }
            Ok(Event::Text(e)) => {
                if coord != Coord::None {
                    let value = e.unescape().ok().and_then(|t| t.trim().parse::<u32>().ok());
                    match coord {
                        Coord::Col => col = value,
                        Coord::Row => row = value,
                        Coord::None => {}
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"col" | b"row" => coord = Coord::None,
                b"from" => in_from = false,
                b"twoCellAnchor" | b"oneCellAnchor" => {
                    if let (Some(row), Some(col), Some(embed)) = (row, col, embed.take()) {
                        anchors.push(Anchor { row, col, embed });
                    }
                    in_anchor = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("描画XMLの解析を中断: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    anchors
}
