//! Sidecar XML codec.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <tileset columns="8" rows="4">
//!   <tile id="3" layername="roof"/>
//! </tileset>
//! ```

use crate::kernel::services::ports::layer_names::{LayerNamesError, Result};
use crate::models::layer_name_table::{TileLayerNameTable, MAX_TILE_COUNT};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::{self, Write};
use std::path::Path;

const ROOT_ELEMENT: &[u8] = b"tileset";
const TILE_ELEMENT: &[u8] = b"tile";
const INDENT: usize = 2;

/// Read a sidecar file. The returned table is clean.
pub fn load(path: &Path) -> Result<TileLayerNameTable> {
    let xml = std::fs::read_to_string(path)
        .map_err(|err| LayerNamesError::parse(path, format!("cannot open file: {}", err)))?;
    parse(&xml, path)
}

/// Parse sidecar text; `file_path` becomes the table's save location.
pub fn parse(xml: &str, file_path: &Path) -> Result<TileLayerNameTable> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut table: Option<TileLayerNameTable> = None;
    let mut depth = 0usize;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|err| {
            LayerNamesError::parse(
                file_path,
                format!("XML parse error at byte {}: {}", reader.buffer_position(), err),
            )
        })?;

        match event {
            Event::Start(e) => {
                read_element(&e, depth, &mut table, file_path)?;
                depth += 1;
            }
            Event::Empty(e) => {
                read_element(&e, depth, &mut table, file_path)?;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Eof if depth != 0 => {
                return Err(LayerNamesError::parse(file_path, "unexpected end of document"));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let mut table = table
        .ok_or_else(|| LayerNamesError::parse(file_path, "not a tileset layer names file"))?;
    table.mark_clean();
    Ok(table)
}

fn read_element(
    e: &BytesStart,
    depth: usize,
    table: &mut Option<TileLayerNameTable>,
    file_path: &Path,
) -> Result<()> {
    match (depth, table.as_mut()) {
        (0, None) => {
            if e.name().as_ref() != ROOT_ELEMENT {
                return Err(LayerNamesError::parse(
                    file_path,
                    "not a tileset layer names file",
                ));
            }
            let columns = required_count(e, b"columns", file_path)?;
            let rows = required_count(e, b"rows", file_path)?;
            match columns.checked_mul(rows) {
                Some(count) if count <= MAX_TILE_COUNT => {}
                _ => {
                    return Err(LayerNamesError::parse(
                        file_path,
                        format!("invalid grid size {}x{}", columns, rows),
                    ))
                }
            }
            *table = Some(TileLayerNameTable::new(file_path, columns, rows));
        }
        (1, Some(table)) if e.name().as_ref() == TILE_ELEMENT => {
            read_tile(e, table, file_path)?;
        }
        _ => {}
    }
    Ok(())
}

fn read_tile(e: &BytesStart, table: &mut TileLayerNameTable, file_path: &Path) -> Result<()> {
    let raw_id = attribute(e, b"id").map_err(|msg| LayerNamesError::parse(file_path, msg))?;
    let name = attribute(e, b"layername")
        .map_err(|msg| LayerNamesError::parse(file_path, msg))?
        .unwrap_or_default();

    let id = raw_id.as_deref().and_then(|v| v.trim().parse::<usize>().ok());
    match id {
        Some(id) if table.contains(id) => {
            table.set_layer_name(id, &name);
        }
        _ => {
            tracing::warn!(
                path = %file_path.display(),
                id = raw_id.as_deref().unwrap_or(""),
                tile_count = table.tile_count(),
                "ignoring tile with invalid id"
            );
        }
    }
    Ok(())
}

fn required_count(e: &BytesStart, name: &[u8], file_path: &Path) -> Result<usize> {
    let label = String::from_utf8_lossy(name);
    let value = attribute(e, name)
        .map_err(|msg| LayerNamesError::parse(file_path, msg))?
        .ok_or_else(|| {
            LayerNamesError::parse(file_path, format!("missing '{}' attribute", label))
        })?;
    value.trim().parse::<usize>().map_err(|_| {
        LayerNamesError::parse(file_path, format!("invalid '{}' value: {}", label, value))
    })
}

fn attribute(e: &BytesStart, name: &[u8]) -> std::result::Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| format!("attribute error: {}", err))?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|err| format!("attribute error: {}", err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Write a dirty table to its file and mark it clean. Clean tables are left
/// alone; a failed write keeps the table dirty.
pub fn save(table: &mut TileLayerNameTable) -> Result<()> {
    if !table.is_dirty() {
        return Ok(());
    }

    let path = table.file_path().to_path_buf();
    let bytes = to_xml(table).map_err(|err| LayerNamesError::io(&path, err))?;

    let mut file = std::fs::File::create(&path).map_err(|err| LayerNamesError::io(&path, err))?;
    file.write_all(&bytes)
        .and_then(|_| file.flush())
        .map_err(|err| LayerNamesError::io(&path, err))?;

    table.mark_clean();
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "layer names saved");
    Ok(())
}

/// Serialized document: only non-empty labels, ascending id.
pub fn to_xml(table: &TileLayerNameTable) -> io::Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(to_io)?;

    let columns = table.columns().to_string();
    let rows = table.rows().to_string();
    let mut root = BytesStart::new("tileset");
    root.push_attribute(("columns", columns.as_str()));
    root.push_attribute(("rows", rows.as_str()));
    writer.write_event(Event::Start(root)).map_err(to_io)?;

    for (id, name) in table.named_tiles() {
        let id = id.to_string();
        let mut tile = BytesStart::new("tile");
        tile.push_attribute(("id", id.as_str()));
        tile.push_attribute(("layername", name));
        writer.write_event(Event::Empty(tile)).map_err(to_io)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("tileset")))
        .map_err(to_io)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn to_io(err: quick_xml::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/layer_names/xml.rs"]
mod tests;
