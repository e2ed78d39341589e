//! block/record — декодер/энкодер 32-байтовой записи block descriptor.
//!
//! Порядок валидации при чтении:
//! 1) размер: от `offset` должно оставаться >= 32 байт (иначе Size);
//! 2) original_offset == 0 && relative_offset == 0 → пустой слот (не ошибка);
//! 3) FORWARDER && reserved != 0 → MalformedRecord;
//! 4) иначе — заполненная запись.

use byteorder::{ByteOrder, LittleEndian};
use log::trace;
use serde::Serialize;

use crate::block::descriptor::{BlockDescriptor, BlockFlags};
use crate::consts::{
    BLOCK_DESCRIPTOR_SIZE, BLOCK_FLAG_IS_FORWARDER, OFF_BITMAP, OFF_FLAGS, OFF_ORIGINAL,
    OFF_RELATIVE, OFF_RESERVED,
};
use crate::error::{BlockError, Result};
use crate::metrics;

/// Поля записи как они лежат на диске.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BlockRecord {
    pub original_offset: i64,
    pub relative_offset: i64,
    pub bitmap_offset: i64,
    pub flags: u32,
    pub reserved: u32,
}

/// Результат чтения слота: пусто или запись.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSlot {
    Empty,
    Block(BlockRecord),
}

/// Результат `BlockDescriptor::read_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Поля descriptor'а заполнены.
    Populated,
    /// Пустой слот; descriptor не тронут.
    Empty,
}

impl BlockRecord {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.original_offset == 0 && self.relative_offset == 0
    }

    #[inline]
    pub fn is_forwarder(&self) -> bool {
        self.flags & BLOCK_FLAG_IS_FORWARDER != 0
    }
}

/// Конец записи в буфере или Size, если не помещается.
fn record_end(len: usize, offset: usize) -> Result<usize> {
    match offset.checked_add(BLOCK_DESCRIPTOR_SIZE) {
        Some(end) if end <= len => Ok(end),
        _ => Err(BlockError::size(format!(
            "block descriptor record needs {} bytes at offset {}, buffer has {}",
            BLOCK_DESCRIPTOR_SIZE, offset, len
        ))),
    }
}

/// Прочитать запись по смещению `offset`.
pub fn block_record_read(data: &[u8], offset: usize) -> Result<RecordSlot> {
    let end = record_end(data.len(), offset)?;
    let rec = &data[offset..end];

    let original_offset = LittleEndian::read_i64(&rec[OFF_ORIGINAL..OFF_ORIGINAL + 8]);
    let relative_offset = LittleEndian::read_i64(&rec[OFF_RELATIVE..OFF_RELATIVE + 8]);

    if original_offset == 0 && relative_offset == 0 {
        metrics::record_decode_empty();
        return Ok(RecordSlot::Empty);
    }

    let record = BlockRecord {
        original_offset,
        relative_offset,
        bitmap_offset: LittleEndian::read_i64(&rec[OFF_BITMAP..OFF_BITMAP + 8]),
        flags: LittleEndian::read_u32(&rec[OFF_FLAGS..OFF_FLAGS + 4]),
        reserved: LittleEndian::read_u32(&rec[OFF_RESERVED..OFF_RESERVED + 4]),
    };

    if record.is_forwarder() && record.reserved != 0 {
        metrics::record_decode_malformed();
        return Err(BlockError::malformed(format!(
            "forwarder at offset {} has non-zero reserved field 0x{:08x}",
            offset, record.reserved
        )));
    }

    metrics::record_decode_populated();
    Ok(RecordSlot::Block(record))
}

/// Записать запись по смещению `offset` (без валидации содержимого).
pub fn block_record_write(buf: &mut [u8], offset: usize, r: &BlockRecord) -> Result<()> {
    let end = record_end(buf.len(), offset)?;
    let rec = &mut buf[offset..end];
    LittleEndian::write_i64(&mut rec[OFF_ORIGINAL..OFF_ORIGINAL + 8], r.original_offset);
    LittleEndian::write_i64(&mut rec[OFF_RELATIVE..OFF_RELATIVE + 8], r.relative_offset);
    LittleEndian::write_i64(&mut rec[OFF_BITMAP..OFF_BITMAP + 8], r.bitmap_offset);
    LittleEndian::write_u32(&mut rec[OFF_FLAGS..OFF_FLAGS + 4], r.flags);
    LittleEndian::write_u32(&mut rec[OFF_RESERVED..OFF_RESERVED + 4], r.reserved);
    Ok(())
}

impl BlockDescriptor {
    /// Декодировать запись из `data[offset..offset + 32]` в этот descriptor.
    ///
    /// На Empty и на ошибке поля не меняются; overlay не трогается никогда.
    pub fn read_data(&mut self, data: &[u8], offset: usize) -> Result<ReadOutcome> {
        match block_record_read(data, offset)? {
            RecordSlot::Empty => Ok(ReadOutcome::Empty),
            RecordSlot::Block(r) => {
                self.apply_record(&r);
                trace!(
                    "block descriptor @{}: original=0x{:08x} relative=0x{:08x} bitmap=0x{:08x} flags=0x{:08x} reserved=0x{:08x}",
                    offset,
                    r.original_offset,
                    r.relative_offset,
                    r.bitmap_offset,
                    r.flags,
                    r.reserved
                );
                Ok(ReadOutcome::Populated)
            }
        }
    }

    /// Descriptor из уже декодированной записи.
    pub fn from_record(r: &BlockRecord) -> Self {
        let mut d = BlockDescriptor::new();
        d.apply_record(r);
        d
    }

    pub fn to_record(&self) -> BlockRecord {
        BlockRecord {
            original_offset: self.original_offset,
            relative_offset: self.relative_offset,
            bitmap_offset: self.bitmap_offset,
            flags: self.flags.bits(),
            reserved: self.reserved,
        }
    }

    fn apply_record(&mut self, r: &BlockRecord) {
        self.original_offset = r.original_offset;
        self.relative_offset = r.relative_offset;
        self.bitmap_offset = r.bitmap_offset;
        self.flags = BlockFlags::from_bits_retain(r.flags);
        self.reserved = r.reserved;
    }
}
