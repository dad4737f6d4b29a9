//! On-disk page layout: a header bitmap followed by a fixed number of
//! fixed-width tuple slots.

use std::sync::Arc;

use bit_vec::BitVec;

use crate::error::DbError;
use crate::page_id::PageId;
use crate::transaction::TransactionId;
use crate::tuple::{RecordId, Tuple};
use crate::tuple_desc::TupleDesc;
use crate::types::DbResult;

/// Number of tuple slots that fit in one page of `page_size` bytes given a
/// tuple of `tuple_width` bytes: each slot costs `tuple_width` bytes plus
/// one bit of header.
pub fn num_slots_for(page_size: usize, tuple_width: usize) -> usize {
    (page_size * 8) / (tuple_width * 8 + 1)
}

fn header_size(num_slots: usize) -> usize {
    (num_slots + 7) / 8
}

/// One page's worth of tuples plus the header bitmap marking which slots
/// are live. Holds the raw bytes of every slot, not just parsed tuples, so
/// that unused slots round-trip byte-for-byte through [`HeapPage::get_page_data`].
pub struct HeapPage {
    pid: PageId,
    tuple_desc: Arc<TupleDesc>,
    num_slots: usize,
    tuple_width: usize,
    header: BitVec,
    slot_bytes: Vec<u8>,
    dirty: Option<TransactionId>,
}

impl HeapPage {
    pub fn construct(pid: PageId, tuple_desc: Arc<TupleDesc>, bytes: &[u8]) -> DbResult<Self> {
        let tuple_width = tuple_desc.size_bytes();
        let num_slots = num_slots_for(bytes.len(), tuple_width);
        let hsize = header_size(num_slots);
        if bytes.len() < hsize + num_slots * tuple_width {
            return Err(DbError::SchemaMismatch(format!(
                "page {} has {} bytes, too few for {} slots of width {}",
                pid,
                bytes.len(),
                num_slots,
                tuple_width
            )));
        }
        let header = BitVec::from_bytes(&bytes[..hsize]);
        let slot_bytes = bytes[hsize..hsize + num_slots * tuple_width].to_vec();
        Ok(HeapPage {
            pid,
            tuple_desc,
            num_slots,
            tuple_width,
            header,
            slot_bytes,
            dirty: None,
        })
    }

    /// An all-zero page of this schema: every slot marked unused.
    pub fn create_empty_page_data(page_size: usize, _tuple_desc: &TupleDesc) -> Vec<u8> {
        vec![0u8; page_size]
    }

    pub fn page_id(&self) -> PageId {
        self.pid
    }

    pub fn tuple_desc(&self) -> Arc<TupleDesc> {
        self.tuple_desc.clone()
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    fn is_slot_used(&self, slot: usize) -> bool {
        self.header.get(slot).unwrap_or(false)
    }

    fn set_slot_used(&mut self, slot: usize, used: bool) {
        self.header.set(slot, used);
    }

    pub fn get_num_used_slots(&self) -> usize {
        (0..self.num_slots).filter(|&s| self.is_slot_used(s)).count()
    }

    pub fn get_num_unused_slots(&self) -> usize {
        self.num_slots - self.get_num_used_slots()
    }

    /// Finds the lowest-indexed unused slot and installs `t` there,
    /// stamping its `RecordId`. Fails if the page is full or `t`'s schema
    /// does not match this page's.
    pub fn insert_tuple(&mut self, t: &mut Tuple) -> DbResult<()> {
        if *t.scheme() != *self.tuple_desc {
            return Err(DbError::SchemaMismatch(format!(
                "tuple schema {} does not match page schema {}",
                t.scheme(),
                self.tuple_desc
            )));
        }
        let slot = (0..self.num_slots)
            .find(|&s| !self.is_slot_used(s))
            .ok_or(DbError::PageFull)?;
        let bytes = t.serialize();
        let start = slot * self.tuple_width;
        self.slot_bytes[start..start + self.tuple_width].copy_from_slice(&bytes);
        self.set_slot_used(slot, true);
        t.set_record_id(RecordId::new(self.pid, slot));
        Ok(())
    }

    /// Clears `t`'s slot. Fails if `t` is not recorded as living on this page.
    pub fn delete_tuple(&mut self, t: &Tuple) -> DbResult<()> {
        let rid = t.record_id().ok_or_else(|| {
            DbError::SchemaMismatch("tuple has no record id, was never inserted".to_string())
        })?;
        if rid.page_id != self.pid {
            return Err(DbError::SchemaMismatch(format!(
                "tuple's record id points at {} but this page is {}",
                rid.page_id, self.pid
            )));
        }
        if !self.is_slot_used(rid.slot) {
            return Err(DbError::SchemaMismatch(format!(
                "slot {} on {} is already empty",
                rid.slot, self.pid
            )));
        }
        self.set_slot_used(rid.slot, false);
        Ok(())
    }

    pub fn mark_dirty(&mut self, dirty: bool, tid: TransactionId) {
        self.dirty = if dirty { Some(tid) } else { None };
    }

    pub fn is_dirty(&self) -> Option<TransactionId> {
        self.dirty
    }

    /// Tuples of every used slot, in ascending slot order.
    pub fn iterator(&self) -> impl Iterator<Item = Tuple> + '_ {
        (0..self.num_slots).filter_map(move |slot| {
            if !self.is_slot_used(slot) {
                return None;
            }
            let start = slot * self.tuple_width;
            let mut t = Tuple::deserialize(
                self.tuple_desc.clone(),
                &self.slot_bytes[start..start + self.tuple_width],
            );
            t.set_record_id(RecordId::new(self.pid, slot));
            Some(t)
        })
    }

    /// Serializes back to the exact byte layout this page was constructed
    /// from, with used slots reflecting their current tuple contents.
    pub fn get_page_data(&self, page_size: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(page_size);
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.slot_bytes);
        out.resize(page_size, 0);
        out
    }
}
