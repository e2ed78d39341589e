use anyhow::{anyhow, Result};
use std::path::PathBuf;

use VShadow::block::{block_record_read, RecordSlot};
use VShadow::consts::BLOCK_DESCRIPTOR_SIZE;

use super::util::{decode_hex, flags_text, read_all, record_dump};

// Байты источника; --offset применяется одинаково к файлу и к --hex.
fn load(hex: Option<String>, file: Option<PathBuf>) -> Result<Vec<u8>> {
    match (file, hex) {
        (Some(p), None) => read_all(&p),
        (None, Some(h)) => decode_hex(&h),
        (Some(_), Some(_)) => Err(anyhow!("--hex and --file are mutually exclusive")),
        (None, None) => Err(anyhow!("either --hex or --file is required")),
    }
}

pub fn exec(hex: Option<String>, file: Option<PathBuf>, offset: usize, json: bool) -> Result<()> {
    let data = load(hex, file)?;

    let end = offset.saturating_add(BLOCK_DESCRIPTOR_SIZE).min(data.len());
    let raw = data.get(offset..end).unwrap_or(&[]);

    let slot = block_record_read(&data, offset)?;

    if json {
        let v = match slot {
            RecordSlot::Empty => serde_json::json!({ "offset": offset, "empty": true }),
            RecordSlot::Block(r) => serde_json::json!({
                "offset": offset,
                "empty": false,
                "record": r,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&v)?);
        return Ok(());
    }

    println!("record @{}:", offset);
    println!("{}", record_dump(raw));
    match slot {
        RecordSlot::Empty => println!("EMPTY (original_offset=0, relative_offset=0)"),
        RecordSlot::Block(r) => {
            println!("original_offset: 0x{:08x}", r.original_offset);
            println!("relative_offset: 0x{:08x}", r.relative_offset);
            println!("bitmap_offset:   0x{:08x}", r.bitmap_offset);
            println!("flags:           0x{:08x} ({})", r.flags, flags_text(r.flags));
            println!("reserved:        0x{:08x}", r.reserved);
        }
    }
    Ok(())
}
