use std::fmt::{self, Display, Formatter};

use crate::string::ObjString;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjType {
    String,
}

impl ObjType {
    pub fn to_str(self) -> &'static str {
        match self {
            ObjType::String => "string",
        }
    }
}

impl Display for ObjType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Handle to an object owned by a [`Heap`][crate::heap::Heap].
///
/// A handle is the id of the heap that allocated it plus an index into that
/// heap's arena. Handles stay valid for as long as the heap lives, since
/// nothing is freed before then. Every dereference checks both parts, so a
/// handle carried over from another heap is rejected instead of resolving to
/// whatever object shares its index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef {
    heap: u32,
    index: u32,
}

impl ObjRef {
    pub(crate) fn new(heap: u32, index: usize) -> ObjRef {
        ObjRef {
            heap,
            index: index as u32,
        }
    }

    pub fn heap_id(self) -> u32 {
        self.heap
    }

    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl Display for ObjRef {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "obj#{}:{}", self.heap, self.index)
    }
}

/// Variant payloads. One per [`ObjType`].
#[derive(Debug)]
pub enum ObjBody {
    String(ObjString),
}

#[derive(Debug)]
pub struct Obj {
    /// Next older allocation, `None` at the tail of the list.
    pub next: Option<ObjRef>,
    pub body: ObjBody,
}

impl Obj {
    pub fn obj_type(&self) -> ObjType {
        match self.body {
            ObjBody::String(_) => ObjType::String,
        }
    }

    pub fn as_a<T: Object>(&self) -> Option<&T> {
        if self.obj_type() == T::TAG {
            T::from_body(&self.body)
        } else {
            None
        }
    }

    /// Heap bytes attributed to this object, header included.
    pub fn size(&self) -> usize {
        let payload = match &self.body {
            ObjBody::String(s) => s.capacity(),
        };
        std::mem::size_of::<Obj>() + payload
    }
}

impl Display for Obj {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.body {
            ObjBody::String(s) => write!(f, "{}", s),
        }
    }
}

pub trait Object: Sized {
    const TAG: ObjType;

    fn from_body(body: &ObjBody) -> Option<&Self>;

    fn into_body(self) -> ObjBody;
}
