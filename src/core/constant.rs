//! Typed immutable constants.
//!
//! A constant owns a bit pattern matching its type's in-memory layout.
//! Patterns no larger than a pointer live inline; larger ones own a
//! heap buffer. Setting data normalizes booleans to 0/1 and zeroes
//! aggregate padding recursively, so equal logical values always have
//! equal bytes and equal hashes.

use crate::core::pool::{Pool, ValueRef};
use crate::core::types::{align_up, Type, TypeTag};
use crate::core::value::ValueKind;

const INLINE_CAPACITY: usize = std::mem::size_of::<usize>();

pub(crate) enum ConstStorage {
    Inline([u8; INLINE_CAPACITY]),
    Heap(Box<[u8]>),
}

pub struct ConstantData {
    pub(crate) storage: ConstStorage,
    pub(crate) hash: u64,
    pub(crate) next: Option<ValueRef>,
    pub(crate) linked: bool,
}

const HASH_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

fn fnv1a(seed: u64, bytes: &[u8]) -> u64 {
    let mut h = seed ^ 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

fn hash_combine(a: u64, b: u64) -> u64 {
    a ^ b.wrapping_add(HASH_SEED).wrapping_add(a << 6).wrapping_add(a >> 2)
}

/// Copies `raw` into `out` with bools normalized to exactly 0x00/0x01
/// and aggregate padding left zeroed. `out` must be pre-zeroed.
fn fill_constant_data(ty: &'static Type, raw: &[u8], out: &mut [u8]) {
    if ty.is_bool() {
        out[0] = u8::from(raw[0] != 0);
    } else if ty.is_scalar() {
        out[..ty.size()].copy_from_slice(&raw[..ty.size()]);
    } else {
        match ty.tag() {
            TypeTag::Vector | TypeTag::Array => {
                let elem = ty.element().unwrap();
                for i in 0..ty.dimension() {
                    let offset = i * elem.size();
                    fill_constant_data(elem, &raw[offset..], &mut out[offset..]);
                }
            }
            TypeTag::Matrix => {
                let column = Type::vector(ty.element().unwrap(), ty.dimension());
                for i in 0..ty.dimension() {
                    let offset = i * column.size();
                    fill_constant_data(column, &raw[offset..], &mut out[offset..]);
                }
            }
            TypeTag::Structure => {
                let mut offset = 0usize;
                for m in ty.members() {
                    offset = align_up(offset, m.alignment());
                    fill_constant_data(m, &raw[offset..], &mut out[offset..]);
                    offset += m.size();
                }
            }
            _ => panic!("unsupported constant type {}", ty),
        }
    }
}

impl Pool {
    /// Allocates a constant. `data`, when present, must hold at least
    /// `ty.size()` bytes in the type's in-memory layout; `None` leaves
    /// the constant zeroed with a cleared hash.
    pub(crate) fn alloc_constant(&mut self, ty: &'static Type, data: Option<&[u8]>) -> ValueRef {
        let storage = if ty.size() <= INLINE_CAPACITY {
            ConstStorage::Inline([0u8; INLINE_CAPACITY])
        } else {
            ConstStorage::Heap(vec![0u8; ty.size()].into_boxed_slice())
        };
        let c = self.alloc_value(
            Some(ty),
            ValueKind::Constant(ConstantData {
                storage,
                hash: 0,
                next: None,
                linked: false,
            }),
        );
        if let Some(data) = data {
            self.set_constant_data(c, data);
        }
        c
    }

    fn constant(&self, c: ValueRef) -> &ConstantData {
        match &self.val(c).kind {
            ValueKind::Constant(data) => data,
            _ => panic!("value is not a constant"),
        }
    }

    pub(crate) fn constant_mut(&mut self, c: ValueRef) -> &mut ConstantData {
        match &mut self.val_mut(c).kind {
            ValueKind::Constant(data) => data,
            _ => panic!("value is not a constant"),
        }
    }

    /// The normalized bytes, exactly `type().size()` long.
    pub fn constant_data(&self, c: ValueRef) -> &[u8] {
        let size = self.value_type(c).unwrap().size();
        match &self.constant(c).storage {
            ConstStorage::Inline(bytes) => &bytes[..size],
            ConstStorage::Heap(bytes) => &bytes[..size],
        }
    }

    /// Rewrites the bit pattern in place, keeping the type. The hash
    /// is cleared and recomputed from the normalized bytes.
    pub fn set_constant_data(&mut self, c: ValueRef, data: &[u8]) {
        let ty = self.value_type(c).expect("constant must be typed");
        assert!(data.len() >= ty.size(), "constant data too short for {}", ty);
        let mut normalized = vec![0u8; ty.size()];
        fill_constant_data(ty, data, &mut normalized);
        let hash = hash_combine(ty.identity_hash(), fnv1a(HASH_SEED, &normalized));
        let constant = self.constant_mut(c);
        match &mut constant.storage {
            ConstStorage::Inline(bytes) => bytes[..normalized.len()].copy_from_slice(&normalized),
            ConstStorage::Heap(bytes) => bytes.copy_from_slice(&normalized),
        }
        constant.hash = hash;
    }

    pub fn constant_hash(&self, c: ValueRef) -> u64 {
        self.constant(c).hash
    }

    /// Reads the constant back as a little-endian unsigned integer.
    /// Only valid for integer-typed constants.
    pub fn constant_as_u64(&self, c: ValueRef) -> u64 {
        let ty = self.value_type(c).unwrap();
        assert!(ty.is_integer() || ty.is_bool(), "constant {} is not an integer", ty);
        let mut bytes = [0u8; 8];
        let data = self.constant_data(c);
        bytes[..data.len()].copy_from_slice(data);
        u64::from_le_bytes(bytes)
    }
}
