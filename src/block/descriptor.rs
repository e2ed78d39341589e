//! block/descriptor — BlockDescriptor: один перенаправленный блок store + владеемая overlay-цепочка.
//!
//! Цепочка однонаправленная: descriptor владеет (Box) descriptor'ом предыдущего поколения,
//! который он перекрывает. Ссылка ставится не более одного раза владельцем, поэтому циклов нет.

use std::fmt;

use serde::Serialize;

use crate::consts::{BLOCK_FLAG_IS_FORWARDER, BLOCK_FLAG_IS_OVERLAY, BLOCK_FLAG_NOT_USED};
use crate::error::{BlockError, Result};

bitflags::bitflags! {
    /// Флаги записи. Неизвестные биты сохраняются как есть.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlockFlags: u32 {
        const FORWARDER = BLOCK_FLAG_IS_FORWARDER;
        const OVERLAY = BLOCK_FLAG_IS_OVERLAY;
        const NOT_USED = BLOCK_FLAG_NOT_USED;
        const _ = !0;
    }
}

impl Default for BlockFlags {
    fn default() -> Self {
        BlockFlags::empty()
    }
}

/// Descriptor одного блока в store.
///
/// Скалярные поля публичны: индекс/коллекция использует их как ключи.
/// `overlay` доступен только через методы, чтобы линковка оставалась однократной.
#[derive(Default)]
pub struct BlockDescriptor {
    /// Смещение блока в исходном томе.
    pub original_offset: i64,
    /// Смещение блока в адресном пространстве shadow copy.
    pub relative_offset: i64,
    /// Смещение, на которое перенаправляет forwarder.
    pub bitmap_offset: i64,
    pub flags: BlockFlags,
    /// Хвостовое u32 поле записи (проверяется только при FORWARDER).
    pub reserved: u32,
    pub(crate) overlay: Option<Box<BlockDescriptor>>,
}

impl BlockDescriptor {
    /// Zero-initialized descriptor без overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor с заданными offsets; остальные поля нулевые.
    pub fn with_offsets(original_offset: i64, relative_offset: i64) -> Self {
        // `..Self::default()` недоступен: тип реализует Drop
        Self {
            original_offset,
            relative_offset,
            bitmap_offset: 0,
            flags: BlockFlags::empty(),
            reserved: 0,
            overlay: None,
        }
    }

    /// Аллоцировать descriptor в пустой handle.
    /// Ошибка Argument, если handle уже занят (старое значение не трогается).
    pub fn initialize(handle: &mut Option<Box<BlockDescriptor>>) -> Result<()> {
        if handle.is_some() {
            return Err(BlockError::argument(
                "invalid block descriptor handle: value already set",
            ));
        }
        *handle = Some(Box::new(BlockDescriptor::new()));
        Ok(())
    }

    #[inline]
    pub fn is_forwarder(&self) -> bool {
        self.flags.contains(BlockFlags::FORWARDER)
    }

    #[inline]
    pub fn is_overlay(&self) -> bool {
        self.flags.contains(BlockFlags::OVERLAY)
    }

    /// Descriptor поколения, которое перекрывает этот.
    pub fn overlay(&self) -> Option<&BlockDescriptor> {
        self.overlay.as_deref()
    }

    pub fn overlay_mut(&mut self) -> Option<&mut BlockDescriptor> {
        self.overlay.as_deref_mut()
    }

    /// Прилинковать более старое поколение. Ссылка ставится один раз.
    pub fn set_overlay(&mut self, overlay: Box<BlockDescriptor>) -> Result<()> {
        if self.overlay.is_some() {
            return Err(BlockError::argument(
                "invalid block descriptor: overlay already set",
            ));
        }
        self.overlay = Some(overlay);
        Ok(())
    }

    /// Отсоединить overlay-цепочку; владение переходит вызывающему.
    pub fn take_overlay(&mut self) -> Option<Box<BlockDescriptor>> {
        self.overlay.take()
    }

    /// Обход цепочки: self → overlay → overlay.overlay ...
    pub fn iter_chain(&self) -> ChainIter<'_> {
        ChainIter { next: Some(self) }
    }

    /// Число descriptor'ов в цепочке, включая self.
    pub fn chain_len(&self) -> usize {
        self.iter_chain().count()
    }

    /// Копия скалярных полей без overlay.
    pub(crate) fn shallow_copy(&self) -> BlockDescriptor {
        BlockDescriptor {
            original_offset: self.original_offset,
            relative_offset: self.relative_offset,
            bitmap_offset: self.bitmap_offset,
            flags: self.flags,
            reserved: self.reserved,
            overlay: None,
        }
    }

    /// Скалярные поля равны (overlay не сравнивается).
    pub fn fields_eq(&self, other: &BlockDescriptor) -> bool {
        self.original_offset == other.original_offset
            && self.relative_offset == other.relative_offset
            && self.bitmap_offset == other.bitmap_offset
            && self.flags == other.flags
            && self.reserved == other.reserved
    }

    /// Поэлементное сравнение двух цепочек на всю глубину.
    pub fn chain_eq(&self, other: &BlockDescriptor) -> bool {
        let mut a = self.iter_chain();
        let mut b = other.iter_chain();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some(x), Some(y)) if x.fields_eq(y) => continue,
                _ => return false,
            }
        }
    }

    /// Плоское представление для JSON/отчётов.
    pub fn summary(&self) -> DescriptorSummary {
        DescriptorSummary {
            original_offset: self.original_offset,
            relative_offset: self.relative_offset,
            bitmap_offset: self.bitmap_offset,
            flags: self.flags.bits(),
            reserved: self.reserved,
            forwarder: self.is_forwarder(),
            overlay: self.is_overlay(),
            overlay_depth: self.chain_len() - 1,
        }
    }
}

// Итеративный drop: длинная цепочка не должна раскручивать стек рекурсией.
impl Drop for BlockDescriptor {
    fn drop(&mut self) {
        let mut next = self.overlay.take();
        while let Some(mut node) = next {
            next = node.overlay.take();
        }
    }
}

impl fmt::Debug for BlockDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockDescriptor")
            .field("original_offset", &format_args!("0x{:08x}", self.original_offset))
            .field("relative_offset", &format_args!("0x{:08x}", self.relative_offset))
            .field("bitmap_offset", &format_args!("0x{:08x}", self.bitmap_offset))
            .field("flags", &self.flags)
            .field("reserved", &format_args!("0x{:08x}", self.reserved))
            .field("overlay_depth", &(self.chain_len() - 1))
            .finish()
    }
}

/// Итератор по overlay-цепочке (от нового поколения к старому).
pub struct ChainIter<'a> {
    next: Option<&'a BlockDescriptor>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a BlockDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = cur.overlay.as_deref();
        Some(cur)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DescriptorSummary {
    pub original_offset: i64,
    pub relative_offset: i64,
    pub bitmap_offset: i64,
    pub flags: u32,
    pub reserved: u32,
    pub forwarder: bool,
    pub overlay: bool,
    pub overlay_depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_into_empty_handle() {
        let mut h = None;
        BlockDescriptor::initialize(&mut h).unwrap();
        let d = h.as_ref().unwrap();
        assert_eq!(d.original_offset, 0);
        assert_eq!(d.relative_offset, 0);
        assert!(d.flags.is_empty());
        assert!(d.overlay().is_none());
    }

    #[test]
    fn initialize_rejects_occupied_handle() {
        let mut h = Some(Box::new(BlockDescriptor::with_offsets(7, 0)));
        let err = BlockDescriptor::initialize(&mut h).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Argument);
        assert_eq!(h.unwrap().original_offset, 7);
    }

    #[test]
    fn with_offsets_zeroes_the_rest() {
        let d = BlockDescriptor::with_offsets(0x4000, -0x4000);
        assert_eq!(d.original_offset, 0x4000);
        assert_eq!(d.relative_offset, -0x4000);
        assert_eq!(d.bitmap_offset, 0);
        assert!(d.flags.is_empty());
        assert_eq!(d.reserved, 0);
        assert!(d.overlay().is_none());
    }

    #[test]
    fn overlay_links_once() {
        let mut d = BlockDescriptor::new();
        d.set_overlay(Box::new(BlockDescriptor::new())).unwrap();
        assert!(d.set_overlay(Box::new(BlockDescriptor::new())).is_err());
        assert_eq!(d.chain_len(), 2);
        let old = d.take_overlay().unwrap();
        assert_eq!(old.chain_len(), 1);
        assert_eq!(d.chain_len(), 1);
    }

    #[test]
    fn unknown_flag_bits_retained() {
        let f = BlockFlags::from_bits_retain(0x8000_0003);
        assert!(f.contains(BlockFlags::FORWARDER | BlockFlags::OVERLAY));
        assert_eq!(f.bits(), 0x8000_0003);
    }

    #[test]
    fn deep_chain_drops_without_recursion() {
        let mut head = Box::new(BlockDescriptor::new());
        for i in 1..200_000i64 {
            let mut newer = Box::new(BlockDescriptor::new());
            newer.original_offset = i;
            newer.set_overlay(head).unwrap();
            head = newer;
        }
        assert_eq!(head.chain_len(), 200_000);
        drop(head);
    }
}
