use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::io::Read;
use std::path::PathBuf;

use VShadow::consts::{OFF_BITMAP, OFF_FLAGS, OFF_ORIGINAL, OFF_RELATIVE, OFF_RESERVED};

/// Hex → байты; пробелы и ':' игнорируются.
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = s
        .bytes()
        .filter(|c| !c.is_ascii_whitespace() && *c != b':')
        .collect();
    if digits.len() % 2 != 0 {
        return Err(anyhow!("hex string has an odd number of digits ({})", digits.len()));
    }
    digits
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            Some(pair)
                .filter(|p| p.iter().all(u8::is_ascii_hexdigit))
                .and_then(|p| std::str::from_utf8(p).ok())
                .and_then(|p| u8::from_str_radix(p, 16).ok())
                .ok_or_else(|| anyhow!("invalid hex byte #{}", i))
        })
        .collect()
}

const RECORD_FIELDS: [(&str, usize, usize); 5] = [
    ("original", OFF_ORIGINAL, 8),
    ("relative", OFF_RELATIVE, 8),
    ("bitmap", OFF_BITMAP, 8),
    ("flags", OFF_FLAGS, 4),
    ("reserved", OFF_RESERVED, 4),
];

/// Дамп 32-байтовой записи по полям: `+OFF name  bytes`.
/// Обрезанная запись выводится до последнего целого поля.
pub fn record_dump(raw: &[u8]) -> String {
    let mut lines = Vec::with_capacity(RECORD_FIELDS.len());
    for (name, off, len) in RECORD_FIELDS {
        let Some(bytes) = raw.get(off..off + len) else {
            break;
        };
        let hex: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        lines.push(format!("+{:02} {:<9} {}", off, name, hex.join(" ")));
    }
    lines.join("\n")
}

pub fn read_all(p: &PathBuf) -> Result<Vec<u8>> {
    let mut f = OpenOptions::new()
        .read(true)
        .open(p)
        .with_context(|| format!("open {}", p.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn flags_text(flags: u32) -> String {
    let mut parts = Vec::new();
    if flags & VShadow::consts::BLOCK_FLAG_IS_FORWARDER != 0 {
        parts.push("forwarder");
    }
    if flags & VShadow::consts::BLOCK_FLAG_IS_OVERLAY != 0 {
        parts.push("overlay");
    }
    if flags & VShadow::consts::BLOCK_FLAG_NOT_USED != 0 {
        parts.push("not-used");
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join("|")
    }
}
