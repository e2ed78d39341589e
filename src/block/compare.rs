//! block/compare — компараторы для индексации descriptor'ов по смещению.
//!
//! | Comparator | Левый ключ | Правый ключ |
//! |------------|------------|-------------|
//! | by_original_offset | a.original_offset | b.original_offset |
//! | by_relative_offset | a.relative_offset | b.relative_offset |
//! | reverse | a.original_offset | b.relative_offset |
//! | range_by_original_offset_value | value | d.original_offset |
//! | range_by_relative_offset_value | value | d.relative_offset |
//!
//! `cmp_*` — для sort/binary search; `compare_*` — проверяют наличие операндов.
//! Все функции чистые и безопасны для параллельных читателей.

use std::cmp::Ordering;

use crate::block::descriptor::BlockDescriptor;
use crate::error::{BlockError, Result};

#[inline]
pub fn cmp_by_original_offset(a: &BlockDescriptor, b: &BlockDescriptor) -> Ordering {
    a.original_offset.cmp(&b.original_offset)
}

#[inline]
pub fn cmp_by_relative_offset(a: &BlockDescriptor, b: &BlockDescriptor) -> Ordering {
    a.relative_offset.cmp(&b.relative_offset)
}

/// Перекрёстное сравнение: original_offset первого против relative_offset второго.
/// Используется при слиянии индекса по original с индексом по relative.
#[inline]
pub fn cmp_reverse(a: &BlockDescriptor, b: &BlockDescriptor) -> Ordering {
    a.original_offset.cmp(&b.relative_offset)
}

/// Значение против начала диапазона descriptor'а (original_offset).
#[inline]
pub fn cmp_range_by_original_offset_value(value: i64, d: &BlockDescriptor) -> Ordering {
    value.cmp(&d.original_offset)
}

/// Значение против начала диапазона descriptor'а (relative_offset).
#[inline]
pub fn cmp_range_by_relative_offset_value(value: i64, d: &BlockDescriptor) -> Ordering {
    value.cmp(&d.relative_offset)
}

fn both<'a>(
    a: Option<&'a BlockDescriptor>,
    b: Option<&'a BlockDescriptor>,
) -> Result<(&'a BlockDescriptor, &'a BlockDescriptor)> {
    let a = a.ok_or_else(|| BlockError::argument("invalid first block descriptor"))?;
    let b = b.ok_or_else(|| BlockError::argument("invalid second block descriptor"))?;
    Ok((a, b))
}

fn value_and<'a>(
    value: Option<&i64>,
    d: Option<&'a BlockDescriptor>,
) -> Result<(i64, &'a BlockDescriptor)> {
    let v = value.ok_or_else(|| BlockError::argument("invalid offset value"))?;
    let d = d.ok_or_else(|| BlockError::argument("invalid block descriptor"))?;
    Ok((*v, d))
}

pub fn compare_by_original_offset(
    a: Option<&BlockDescriptor>,
    b: Option<&BlockDescriptor>,
) -> Result<Ordering> {
    let (a, b) = both(a, b)?;
    Ok(cmp_by_original_offset(a, b))
}

pub fn compare_by_relative_offset(
    a: Option<&BlockDescriptor>,
    b: Option<&BlockDescriptor>,
) -> Result<Ordering> {
    let (a, b) = both(a, b)?;
    Ok(cmp_by_relative_offset(a, b))
}

pub fn compare_reverse(
    a: Option<&BlockDescriptor>,
    b: Option<&BlockDescriptor>,
) -> Result<Ordering> {
    let (a, b) = both(a, b)?;
    Ok(cmp_reverse(a, b))
}

pub fn compare_range_by_original_offset_value(
    value: Option<&i64>,
    d: Option<&BlockDescriptor>,
) -> Result<Ordering> {
    let (v, d) = value_and(value, d)?;
    Ok(cmp_range_by_original_offset_value(v, d))
}

pub fn compare_range_by_relative_offset_value(
    value: Option<&i64>,
    d: Option<&BlockDescriptor>,
) -> Result<Ordering> {
    let (v, d) = value_and(value, d)?;
    Ok(cmp_range_by_relative_offset_value(v, d))
}

/// Проверка попадания `value` в `[start, start + block_size)`.
#[inline]
fn covers(start: i64, block_size: u64, value: i64) -> bool {
    let start = start as i128;
    let value = value as i128;
    value >= start && value < start + block_size as i128
}

impl BlockDescriptor {
    /// Лежит ли `value` внутри блока по оси original_offset.
    pub fn contains_original_offset(&self, value: i64, block_size: u64) -> bool {
        covers(self.original_offset, block_size, value)
    }

    /// Лежит ли `value` внутри блока по оси relative_offset.
    pub fn contains_relative_offset(&self, value: i64, block_size: u64) -> bool {
        covers(self.relative_offset, block_size, value)
    }
}

/// Ось, по которой индексируются descriptor'ы.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum IndexOrder {
    #[default]
    Original,
    Relative,
}

impl IndexOrder {
    /// Ключ descriptor'а на этой оси.
    #[inline]
    pub fn key(&self, d: &BlockDescriptor) -> i64 {
        match self {
            IndexOrder::Original => d.original_offset,
            IndexOrder::Relative => d.relative_offset,
        }
    }

    pub fn comparator(&self) -> fn(&BlockDescriptor, &BlockDescriptor) -> Ordering {
        match self {
            IndexOrder::Original => cmp_by_original_offset,
            IndexOrder::Relative => cmp_by_relative_offset,
        }
    }

    pub fn range_comparator(&self) -> fn(i64, &BlockDescriptor) -> Ordering {
        match self {
            IndexOrder::Original => cmp_range_by_original_offset_value,
            IndexOrder::Relative => cmp_range_by_relative_offset_value,
        }
    }

    pub fn compare(&self, a: &BlockDescriptor, b: &BlockDescriptor) -> Ordering {
        self.comparator()(a, b)
    }

    pub fn compare_value(&self, value: i64, d: &BlockDescriptor) -> Ordering {
        self.range_comparator()(value, d)
    }

    pub fn contains(&self, d: &BlockDescriptor, value: i64, block_size: u64) -> bool {
        covers(self.key(d), block_size, value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexOrder::Original => "original",
            IndexOrder::Relative => "relative",
        }
    }
}

impl std::str::FromStr for IndexOrder {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" | "orig" => Ok(IndexOrder::Original),
            "relative" | "rel" => Ok(IndexOrder::Relative),
            other => Err(BlockError::argument(format!("unknown index order '{}'", other))),
        }
    }
}
