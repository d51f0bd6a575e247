use std::sync::atomic::{AtomicU32, Ordering};

use log::trace;
use thiserror::Error;

use crate::{
    object::{Obj, ObjRef, ObjType, Object},
    string::ObjString,
    table::Table,
    value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    #[error("Dangling object reference {0}.")]
    Dangling(ObjRef),
    #[error("Expected a {expected} object but found a {found}.")]
    WrongType { expected: ObjType, found: ObjType },
}

/// Every object a VM has allocated, plus the string intern pool.
///
/// Objects live in an arena and are also threaded into a list through
/// [`Obj::next`], newest first. That list is what a collector would walk;
/// until there is one, objects are only released when the heap is dropped.
#[derive(Debug)]
pub struct Heap {
    id: u32,
    objects: Vec<Obj>,
    head: Option<ObjRef>,
    bytes_allocated: usize,
    strings: Table,
}

static NEXT_HEAP_ID: AtomicU32 = AtomicU32::new(0);

impl Default for Heap {
    fn default() -> Heap {
        Heap::new()
    }
}

impl Heap {
    pub fn new() -> Heap {
        Heap {
            id: NEXT_HEAP_ID.fetch_add(1, Ordering::Relaxed),
            objects: Vec::new(),
            head: None,
            bytes_allocated: 0,
            strings: Table::new(),
        }
    }

    /// Stamped into every handle this heap hands out.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn allocate<T: Object>(&mut self, object: T) -> ObjRef {
        let obj = Obj {
            next: self.head,
            body: object.into_body(),
        };
        let size = obj.size();
        let handle = ObjRef::new(self.id, self.objects.len());

        self.objects.push(obj);
        self.head = Some(handle);
        self.bytes_allocated += size;

        trace!("{} allocate {} for {:?}", handle, size, T::TAG);
        handle
    }

    pub fn get(&self, handle: ObjRef) -> Result<&Obj, HeapError> {
        if handle.heap_id() != self.id {
            return Err(HeapError::Dangling(handle));
        }
        self.objects
            .get(handle.index())
            .ok_or(HeapError::Dangling(handle))
    }

    pub fn get_as<T: Object>(&self, handle: ObjRef) -> Result<&T, HeapError> {
        let obj = self.get(handle)?;
        obj.as_a::<T>().ok_or(HeapError::WrongType {
            expected: T::TAG,
            found: obj.obj_type(),
        })
    }

    /// Walks the allocation list from the newest object.
    pub fn objects(&self) -> Objects<'_> {
        Objects {
            heap: self,
            cursor: self.head,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    pub fn interned_count(&self) -> usize {
        self.strings.len()
    }
}

// Interning
impl Heap {
    pub fn find_interned(&self, chars: &[u8], hash: u32) -> Option<ObjRef> {
        let objects = &self.objects;
        let found = self.strings.find_string(chars, hash, |handle| {
            objects.get(handle.index())?.as_a::<ObjString>()
        });

        if let Some(handle) = found {
            trace!("{} intern hit, {} bytes", handle, chars.len());
        }
        found
    }

    pub(crate) fn intern(&mut self, handle: ObjRef, hash: u32) {
        self.strings.set(handle, hash, Value::Nil);
    }
}

pub struct Objects<'a> {
    heap: &'a Heap,
    cursor: Option<ObjRef>,
}

impl<'a> Iterator for Objects<'a> {
    type Item = (ObjRef, &'a Obj);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let obj = self.heap.get(handle).ok()?;
        self.cursor = obj.next;
        Some((handle, obj))
    }
}
