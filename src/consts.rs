//! Общие константы формата store block descriptor (VSS store block list).

// -------- Block descriptor record --------
// Формат записи (32 байта, little-endian):
// [original_offset i64]  -- смещение блока в исходном томе
// [relative_offset i64]  -- смещение блока в адресном пространстве shadow copy
// [bitmap_offset i64]    -- смысл только при FORWARDER
// [flags u32]            -- BLOCK_FLAG_*
// [reserved u32]         -- должен быть 0 при FORWARDER
pub const BLOCK_DESCRIPTOR_SIZE: usize = 32;

// Offsets inside record
pub const OFF_ORIGINAL: usize = 0;
pub const OFF_RELATIVE: usize = 8;
pub const OFF_BITMAP: usize = 16;
pub const OFF_FLAGS: usize = 24;
pub const OFF_RESERVED: usize = 28;

// -------- Flags --------
pub const BLOCK_FLAG_IS_FORWARDER: u32 = 0x01;
pub const BLOCK_FLAG_IS_OVERLAY: u32 = 0x02;
// Известен по имени, валидации не подлежит.
pub const BLOCK_FLAG_NOT_USED: u32 = 0x04;

// -------- Store blocks --------
/// Размер блока store (16 KiB). Один descriptor покрывает ровно один блок.
pub const BLOCK_SIZE: u64 = 0x4000;

/// Guard на длину overlay-цепочки по умолчанию (поколений на одну позицию).
pub const DEFAULT_MAX_OVERLAY_DEPTH: usize = 1 << 20;
