//! block/chain — жизненный цикл overlay-цепочек: destroy (прямой/обратный) и deep clone.
//!
//! Публичный API:
//! - destroy(handle)            — pre-order: сначала внешний descriptor, затем его overlay и т.д.
//! - destroy_reverse(handle)    — post-order: сначала самое старое поколение, внешний последним.
//! - destroy_with(handle, order, visit) — общий обход с наблюдателем порядка освобождения.
//! - clone_chain(dest, source)  — независимая копия всей цепочки (без лимита длины).
//! - clone_chain_with_limit(dest, source, max_nodes) — то же с бюджетом аллокаций.
//!
//! Handle очищается (None) при успехе; пустой handle — ошибка Argument, ничего не трогается.
//! Обход итеративный: без рекурсии на глубоких цепочках.

use crate::block::descriptor::BlockDescriptor;
use crate::error::{BlockError, Result};
use crate::metrics;

/// Порядок освобождения цепочки.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TeardownOrder {
    /// Внешний (новый) → внутренний (старый).
    #[default]
    Forward,
    /// Внутренний (старый) → внешний (новый).
    Reverse,
}

impl TeardownOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeardownOrder::Forward => "forward",
            TeardownOrder::Reverse => "reverse",
        }
    }
}

impl std::str::FromStr for TeardownOrder {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "fwd" => Ok(TeardownOrder::Forward),
            "reverse" | "rev" => Ok(TeardownOrder::Reverse),
            other => Err(BlockError::argument(format!("unknown teardown order '{}'", other))),
        }
    }
}

/// Освободить descriptor и всю его overlay-цепочку (внешний первым).
/// Возвращает число освобождённых descriptor'ов.
pub fn destroy(handle: &mut Option<Box<BlockDescriptor>>) -> Result<usize> {
    destroy_with(handle, TeardownOrder::Forward, |_| {})
}

/// Освободить цепочку начиная с самого старого поколения.
pub fn destroy_reverse(handle: &mut Option<Box<BlockDescriptor>>) -> Result<usize> {
    destroy_with(handle, TeardownOrder::Reverse, |_| {})
}

/// Общий обход освобождения. `visit` вызывается для каждого descriptor'а
/// непосредственно перед его освобождением (overlay к этому моменту уже отсоединён).
pub fn destroy_with<F>(
    handle: &mut Option<Box<BlockDescriptor>>,
    order: TeardownOrder,
    mut visit: F,
) -> Result<usize>
where
    F: FnMut(&BlockDescriptor),
{
    let root = handle
        .take()
        .ok_or_else(|| BlockError::argument("invalid block descriptor handle: no value"))?;

    let released = match order {
        TeardownOrder::Forward => release_forward(Some(root), &mut visit),
        TeardownOrder::Reverse => release_forward(reverse_links(root), &mut visit),
    };
    metrics::record_descriptors_released(released as u64);
    Ok(released)
}

fn release_forward<F>(head: Option<Box<BlockDescriptor>>, visit: &mut F) -> usize
where
    F: FnMut(&BlockDescriptor),
{
    let mut next = head;
    let mut released = 0usize;
    while let Some(mut node) = next {
        next = node.overlay.take();
        visit(&node);
        drop(node);
        released += 1;
    }
    released
}

// Разворот ссылок на месте: самое старое поколение становится головой.
// Без дополнительных аллокаций, поэтому teardown не может упасть посередине.
fn reverse_links(root: Box<BlockDescriptor>) -> Option<Box<BlockDescriptor>> {
    let mut reversed: Option<Box<BlockDescriptor>> = None;
    let mut cur = Some(root);
    while let Some(mut node) = cur {
        cur = node.overlay.take();
        node.overlay = reversed;
        reversed = Some(node);
    }
    reversed
}

/// Глубокая копия цепочки `source` в пустой `dest`.
/// `source == None` → `dest` остаётся None, успех.
/// Ограничения по длине нет: падает только если не удалось выделить память.
pub fn clone_chain(
    dest: &mut Option<Box<BlockDescriptor>>,
    source: Option<&BlockDescriptor>,
) -> Result<()> {
    clone_into(dest, source, None)
}

/// Глубокая копия с бюджетом `max_nodes` descriptor'ов.
///
/// При любой ошибке частично собранная копия освобождается, `dest` остаётся None,
/// `source` не меняется.
pub fn clone_chain_with_limit(
    dest: &mut Option<Box<BlockDescriptor>>,
    source: Option<&BlockDescriptor>,
    max_nodes: usize,
) -> Result<()> {
    clone_into(dest, source, Some(max_nodes))
}

fn clone_into(
    dest: &mut Option<Box<BlockDescriptor>>,
    source: Option<&BlockDescriptor>,
    max_nodes: Option<usize>,
) -> Result<()> {
    if dest.is_some() {
        return Err(BlockError::argument(
            "invalid destination block descriptor handle: value already set",
        ));
    }
    let Some(source) = source else {
        return Ok(());
    };

    let depth = match max_nodes {
        Some(max) => {
            // Считаем не дальше max + 1, чтобы не проходить огромную цепочку целиком.
            let depth = source.iter_chain().take(max.saturating_add(1)).count();
            if depth > max {
                return Err(BlockError::allocation(format!(
                    "overlay chain exceeds clone budget of {} descriptors",
                    max
                )));
            }
            depth
        }
        None => source.chain_len(),
    };

    let mut nodes: Vec<Box<BlockDescriptor>> = Vec::new();
    nodes.try_reserve_exact(depth)?;
    for src in source.iter_chain() {
        nodes.push(Box::new(src.shallow_copy()));
    }

    // Линкуем от самого старого поколения к новому.
    let mut chain: Option<Box<BlockDescriptor>> = None;
    while let Some(mut node) = nodes.pop() {
        node.overlay = chain;
        chain = Some(node);
    }

    *dest = chain;
    metrics::record_descriptors_cloned(depth as u64);
    Ok(())
}

impl BlockDescriptor {
    /// Удобная обёртка над clone_chain для уже существующего descriptor'а.
    pub fn try_clone_chain(&self) -> Result<Box<BlockDescriptor>> {
        let mut out = None;
        clone_chain(&mut out, Some(self))?;
        out.ok_or_else(|| BlockError::allocation("clone produced no descriptor"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(offsets: &[i64]) -> Box<BlockDescriptor> {
        // offsets[0] — внешний descriptor
        let mut head: Option<Box<BlockDescriptor>> = None;
        for &o in offsets.iter().rev() {
            let mut d = Box::new(BlockDescriptor::with_offsets(o, 0));
            if let Some(old) = head.take() {
                d.set_overlay(old).unwrap();
            }
            head = Some(d);
        }
        head.unwrap()
    }

    #[test]
    fn reverse_links_flips_order() {
        let reversed = reverse_links(chain_of(&[1, 2, 3])).unwrap();
        let order: Vec<i64> = reversed.iter_chain().map(|d| d.original_offset).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn teardown_order_parses() {
        assert_eq!("reverse".parse::<TeardownOrder>().unwrap(), TeardownOrder::Reverse);
        assert_eq!(" Forward ".parse::<TeardownOrder>().unwrap(), TeardownOrder::Forward);
        assert!("inside-out".parse::<TeardownOrder>().is_err());
    }

    #[test]
    fn clone_budget_exact_fit() {
        let src = chain_of(&[1, 2, 3]);
        let mut dst = None;
        clone_chain_with_limit(&mut dst, Some(&src), 3).unwrap();
        assert!(dst.unwrap().chain_eq(&src));
    }
}
