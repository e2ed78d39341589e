//! index — отсортированный индекс descriptor'ов по одной оси (original или relative offset).
//!
//! Владеет descriptor'ами (и их overlay-цепочками). Ключи уникальны: вставка descriptor'а
//! с уже занятым ключом делает его новым поколением, а прежний уходит в его overlay.
//! Поиск — бинарный, через компараторы из block::compare.
//!
//! Индекс не синхронизирован: параллельные мутации сериализует владелец.

use std::cmp::Ordering;

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::block::{clone_chain, destroy_with, BlockDescriptor, IndexOrder, ReadOutcome};
use crate::config::BlockConfig;
use crate::consts::BLOCK_DESCRIPTOR_SIZE;
use crate::error::{BlockError, ErrorKind, Result};
use crate::metrics;

/// Итог вставки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Ключ был свободен.
    Inserted,
    /// Ключ был занят; прежний descriptor стал overlay нового.
    Superseded,
}

/// Отказ `BlockIndex::insert`: причина и descriptor, который не был вставлен.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct InsertRejected {
    pub error: BlockError,
    pub descriptor: Box<BlockDescriptor>,
}

impl InsertRejected {
    fn new(error: BlockError, descriptor: Box<BlockDescriptor>) -> Self {
        Self { error, descriptor }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn into_parts(self) -> (BlockError, Box<BlockDescriptor>) {
        (self.error, self.descriptor)
    }
}

impl From<InsertRejected> for BlockError {
    fn from(r: InsertRejected) -> Self {
        r.error
    }
}

/// Статистика `load_records`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub records: usize,
    pub empty: usize,
    pub inserted: usize,
    pub superseded: usize,
    pub forwarders: usize,
}

pub struct BlockIndex {
    order: IndexOrder,
    cfg: BlockConfig,
    entries: Vec<Box<BlockDescriptor>>,
}

impl BlockIndex {
    pub fn new(order: IndexOrder) -> Self {
        Self::with_config(order, BlockConfig::default())
    }

    pub fn with_config(order: IndexOrder, cfg: BlockConfig) -> Self {
        Self {
            order,
            cfg,
            entries: Vec::new(),
        }
    }

    pub fn order(&self) -> IndexOrder {
        self.order
    }

    pub fn config(&self) -> &BlockConfig {
        &self.cfg
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptor'ы в порядке возрастания ключа.
    pub fn iter(&self) -> impl Iterator<Item = &BlockDescriptor> {
        self.entries.iter().map(|b| b.as_ref())
    }

    /// Суммарное число descriptor'ов во всех цепочках.
    pub fn descriptor_count(&self) -> usize {
        self.iter().map(|d| d.chain_len()).sum()
    }

    fn search(&self, value: i64) -> std::result::Result<usize, usize> {
        let order = self.order;
        self.entries
            .binary_search_by(|e| order.compare_value(value, e).reverse())
    }

    /// Вставить descriptor. Если ключ занят — новый descriptor перекрывает прежний.
    ///
    /// При отказе descriptor возвращается вызывающему внутри `InsertRejected`,
    /// индекс не меняется.
    pub fn insert(
        &mut self,
        desc: Box<BlockDescriptor>,
    ) -> std::result::Result<InsertOutcome, InsertRejected> {
        let key = self.order.key(&desc);
        let max = self.cfg.max_overlay_depth;
        match self.search(key) {
            Ok(pos) => {
                if desc.overlay().is_some() {
                    return Err(InsertRejected::new(
                        BlockError::argument(
                            "cannot supersede with a descriptor that already owns an overlay",
                        ),
                        desc,
                    ));
                }
                if self.entries[pos].chain_len() >= max {
                    warn!("overlay chain at 0x{:x} reached max depth {}", key, max);
                    return Err(InsertRejected::new(
                        BlockError::allocation(format!(
                            "overlay chain at 0x{:x} exceeds max depth {}",
                            key, max
                        )),
                        desc,
                    ));
                }
                let old = std::mem::replace(&mut self.entries[pos], desc);
                self.entries[pos].overlay = Some(old);
                metrics::record_index_supersede();
                Ok(InsertOutcome::Superseded)
            }
            Err(pos) => {
                // уже слинкованная цепочка подчиняется тому же лимиту
                let depth = desc.iter_chain().take(max.saturating_add(1)).count();
                if depth > max {
                    warn!("chain at 0x{:x} is deeper than max depth {}", key, max);
                    return Err(InsertRejected::new(
                        BlockError::allocation(format!(
                            "overlay chain at 0x{:x} exceeds max depth {}",
                            key, max
                        )),
                        desc,
                    ));
                }
                if let Err(e) = self.entries.try_reserve(1) {
                    return Err(InsertRejected::new(e.into(), desc));
                }
                self.entries.insert(pos, desc);
                metrics::record_index_insert();
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    /// Descriptor, ключ которого ровно `value`.
    pub fn get_exact(&self, value: i64) -> Option<&BlockDescriptor> {
        self.search(value).ok().map(|i| self.entries[i].as_ref())
    }

    /// Descriptor, блок которого `[key, key + block_size)` покрывает `value`.
    pub fn find_containing(&self, value: i64) -> Option<&BlockDescriptor> {
        let order = self.order;
        // первый элемент с key > value
        let idx = self
            .entries
            .partition_point(|e| order.compare_value(value, e) != Ordering::Less);
        let cand = self.entries.get(idx.checked_sub(1)?)?;
        if order.contains(cand, value, self.cfg.block_size) {
            Some(cand.as_ref())
        } else {
            None
        }
    }

    /// Извлечь цепочку по точному ключу; владение переходит вызывающему.
    pub fn remove(&mut self, value: i64) -> Option<Box<BlockDescriptor>> {
        let pos = self.search(value).ok()?;
        Some(self.entries.remove(pos))
    }

    /// Прочитать `count` подряд идущих 32-байтовых записей начиная с `base`.
    /// Пустые слоты пропускаются; Size/MalformedRecord прерывают скан.
    /// Записи, прочитанные до ошибки, остаются в индексе.
    pub fn load_records(&mut self, data: &[u8], base: usize, count: usize) -> Result<ScanStats> {
        let mut stats = ScanStats::default();
        for i in 0..count {
            let off = i
                .checked_mul(BLOCK_DESCRIPTOR_SIZE)
                .and_then(|rel| rel.checked_add(base))
                .ok_or_else(|| BlockError::size(format!("record {} offset overflows", i)))?;

            let mut desc = Box::new(BlockDescriptor::new());
            stats.records += 1;
            match desc.read_data(data, off)? {
                ReadOutcome::Empty => {
                    stats.empty += 1;
                }
                ReadOutcome::Populated => {
                    if desc.is_forwarder() {
                        stats.forwarders += 1;
                    }
                    match self.insert(desc)? {
                        InsertOutcome::Inserted => stats.inserted += 1,
                        InsertOutcome::Superseded => stats.superseded += 1,
                    }
                }
            }
        }
        debug!(
            "load_records: base={} count={} -> inserted={} superseded={} empty={} forwarders={}",
            base, count, stats.inserted, stats.superseded, stats.empty, stats.forwarders
        );
        Ok(stats)
    }

    /// Независимая копия индекса (каждая цепочка клонируется целиком).
    pub fn deep_clone(&self) -> Result<BlockIndex> {
        let mut entries: Vec<Box<BlockDescriptor>> = Vec::new();
        entries.try_reserve_exact(self.entries.len())?;
        for e in &self.entries {
            let mut out = None;
            clone_chain(&mut out, Some(e))?;
            if let Some(d) = out {
                entries.push(d);
            }
        }
        Ok(BlockIndex {
            order: self.order,
            cfg: self.cfg.clone(),
            entries,
        })
    }

    /// Освободить все цепочки в порядке `cfg.teardown_order`.
    /// Возвращает число освобождённых descriptor'ов.
    pub fn clear(&mut self) -> Result<usize> {
        let order = self.cfg.teardown_order;
        let mut released = 0usize;
        for e in self.entries.drain(..) {
            released += destroy_with(&mut Some(e), order, |_| {})?;
        }
        debug!("index clear: released {} descriptor(s) ({})", released, order.as_str());
        Ok(released)
    }
}

impl std::fmt::Debug for BlockIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockIndex")
            .field("order", &self.order)
            .field("len", &self.entries.len())
            .field("cfg", &self.cfg)
            .finish()
    }
}
