use std::fmt::{self, Display, Formatter};

use log::trace;

use crate::{
    heap::{Heap, HeapError},
    object::{ObjBody, ObjRef, ObjType, Object},
};

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over the raw bytes.
pub fn hash_string(chars: &[u8]) -> u32 {
    chars.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ byte as u32).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug)]
pub struct ObjString {
    hash: u32,
    chars: Vec<u8>,
}

impl Object for ObjString {
    const TAG: ObjType = ObjType::String;

    fn from_body(body: &ObjBody) -> Option<&Self> {
        match body {
            ObjBody::String(s) => Some(s),
        }
    }

    fn into_body(self) -> ObjBody {
        ObjBody::String(self)
    }
}

impl PartialEq for ObjString {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.chars == other.chars
    }
}

impl Display for ObjString {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.chars))
    }
}

impl ObjString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub(crate) fn capacity(&self) -> usize {
        self.chars.capacity()
    }

    /// Interns a copy of `chars`. The caller keeps its buffer.
    pub fn copy(chars: &[u8], heap: &mut Heap) -> ObjRef {
        let hash = hash_string(chars);
        if let Some(interned) = heap.find_interned(chars, hash) {
            return interned;
        }

        ObjString::allocate(chars.to_vec(), hash, heap)
    }

    /// Interns `chars`, taking ownership of the buffer.
    ///
    /// If the contents are already interned the buffer is dropped here and
    /// the existing object is returned unchanged.
    pub fn take(chars: Vec<u8>, heap: &mut Heap) -> ObjRef {
        let hash = hash_string(&chars);
        if let Some(interned) = heap.find_interned(&chars, hash) {
            trace!("release {} byte buffer, already interned", chars.len());
            return interned;
        }

        ObjString::allocate(chars, hash, heap)
    }

    pub fn concatenate(
        a: ObjRef,
        b: ObjRef,
        heap: &mut Heap,
    ) -> Result<ObjRef, HeapError> {
        let chars = {
            let a = heap.get_as::<ObjString>(a)?;
            let b = heap.get_as::<ObjString>(b)?;
            let mut chars = Vec::with_capacity(a.len() + b.len());
            chars.extend_from_slice(a.as_bytes());
            chars.extend_from_slice(b.as_bytes());
            chars
        };
        Ok(ObjString::take(chars, heap))
    }

    // Allocation and interning happen under the same borrow of `heap`, so no
    // caller can ever see the new object before it is in the table.
    fn allocate(chars: Vec<u8>, hash: u32, heap: &mut Heap) -> ObjRef {
        let obj = heap.allocate(ObjString { hash, chars });
        heap.intern(obj, hash);
        obj
    }
}
