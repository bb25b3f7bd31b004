//! Interned type descriptors.
//!
//! Types are allocated once in a global registry and handed out as
//! `&'static Type`; two types are equal iff they are the same
//! registration. Layout (size, alignment, member offsets) is part of
//! the descriptor because constant normalization and GEP padding
//! remapping need it.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float16,
    Float32,
    Float64,
    Vector,
    Matrix,
    Array,
    Structure,
    Buffer,
    Texture,
    BindlessArray,
    Accel,
    Custom,
}

#[derive(Debug)]
pub struct Type {
    tag: TypeTag,
    size: usize,
    alignment: usize,
    element: Option<&'static Type>,
    dimension: usize,
    members: Vec<&'static Type>,
    name: Option<String>,
}

// Identity semantics: the registry guarantees one allocation per
// distinct type, so pointer comparison is type equality.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self as *const Type as usize).hash(state);
    }
}

#[derive(PartialEq, Eq, Hash)]
enum TypeKey {
    Scalar(TypeTag),
    Vector(usize, usize),
    Matrix(usize, usize),
    Array(usize, usize),
    Structure(Vec<usize>),
    Buffer(usize),
    Texture(usize, usize),
    BindlessArray,
    Accel,
    Custom(String),
}

lazy_static! {
    static ref TYPE_REGISTRY: Mutex<HashMap<TypeKey, &'static Type>> = Mutex::new(HashMap::new());
}

fn intern(key: TypeKey, make: impl FnOnce() -> Type) -> &'static Type {
    let mut registry = TYPE_REGISTRY.lock().unwrap();
    *registry.entry(key).or_insert_with(|| Box::leak(Box::new(make())))
}

fn addr(t: &'static Type) -> usize {
    t as *const Type as usize
}

pub(crate) fn align_up(offset: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (offset + alignment - 1) & !(alignment - 1)
}

const RESOURCE_HANDLE_SIZE: usize = 8;

impl Type {
    fn scalar(tag: TypeTag) -> &'static Type {
        let width = match tag {
            TypeTag::Bool | TypeTag::Int8 | TypeTag::UInt8 => 1,
            TypeTag::Int16 | TypeTag::UInt16 | TypeTag::Float16 => 2,
            TypeTag::Int32 | TypeTag::UInt32 | TypeTag::Float32 => 4,
            TypeTag::Int64 | TypeTag::UInt64 | TypeTag::Float64 => 8,
            _ => unreachable!("not a scalar tag"),
        };
        intern(TypeKey::Scalar(tag), || Type {
            tag,
            size: width,
            alignment: width,
            element: None,
            dimension: 0,
            members: Vec::new(),
            name: None,
        })
    }

    pub fn bool_() -> &'static Type {
        Self::scalar(TypeTag::Bool)
    }
    pub fn int8() -> &'static Type {
        Self::scalar(TypeTag::Int8)
    }
    pub fn uint8() -> &'static Type {
        Self::scalar(TypeTag::UInt8)
    }
    pub fn int16() -> &'static Type {
        Self::scalar(TypeTag::Int16)
    }
    pub fn uint16() -> &'static Type {
        Self::scalar(TypeTag::UInt16)
    }
    pub fn int32() -> &'static Type {
        Self::scalar(TypeTag::Int32)
    }
    pub fn uint32() -> &'static Type {
        Self::scalar(TypeTag::UInt32)
    }
    pub fn int64() -> &'static Type {
        Self::scalar(TypeTag::Int64)
    }
    pub fn uint64() -> &'static Type {
        Self::scalar(TypeTag::UInt64)
    }
    pub fn float16() -> &'static Type {
        Self::scalar(TypeTag::Float16)
    }
    pub fn float32() -> &'static Type {
        Self::scalar(TypeTag::Float32)
    }
    pub fn float64() -> &'static Type {
        Self::scalar(TypeTag::Float64)
    }

    /// A vector of 2, 3, or 4 scalar elements. Three-element vectors
    /// are padded to four, so `vector<f32, 3>` occupies 16 bytes.
    pub fn vector(element: &'static Type, dimension: usize) -> &'static Type {
        assert!(element.is_scalar(), "vector element must be a scalar type");
        assert!((2..=4).contains(&dimension), "vector dimension must be 2, 3, or 4");
        intern(TypeKey::Vector(addr(element), dimension), || {
            let padded = if dimension == 3 { 4 } else { dimension };
            let size = element.size * padded;
            Type {
                tag: TypeTag::Vector,
                size,
                alignment: size.min(16),
                element: Some(element),
                dimension,
                members: Vec::new(),
                name: None,
            }
        })
    }

    /// A square matrix, laid out as `dimension` column vectors.
    pub fn matrix(element: &'static Type, dimension: usize) -> &'static Type {
        assert!(element.is_scalar(), "matrix element must be a scalar type");
        assert!((2..=4).contains(&dimension), "matrix dimension must be 2, 3, or 4");
        let column = Type::vector(element, dimension);
        intern(TypeKey::Matrix(addr(element), dimension), || Type {
            tag: TypeTag::Matrix,
            size: column.size * dimension,
            alignment: column.alignment,
            element: Some(element),
            dimension,
            members: Vec::new(),
            name: None,
        })
    }

    pub fn array(element: &'static Type, length: usize) -> &'static Type {
        assert!(!element.is_resource(), "array element must not be a resource type");
        assert!(length > 0, "array length must be non-zero");
        intern(TypeKey::Array(addr(element), length), || Type {
            tag: TypeTag::Array,
            size: element.size * length,
            alignment: element.alignment,
            element: Some(element),
            dimension: length,
            members: Vec::new(),
            name: None,
        })
    }

    /// A structure with C layout: members at aligned offsets, total
    /// size rounded up to the structure alignment.
    pub fn structure(members: &[&'static Type]) -> &'static Type {
        assert!(!members.is_empty(), "structure must have at least one member");
        let key = TypeKey::Structure(members.iter().map(|m| addr(m)).collect());
        intern(key, || {
            let alignment = members.iter().map(|m| m.alignment).max().unwrap();
            let mut offset = 0usize;
            for m in members {
                offset = align_up(offset, m.alignment);
                offset += m.size;
            }
            Type {
                tag: TypeTag::Structure,
                size: align_up(offset, alignment),
                alignment,
                element: None,
                dimension: 0,
                members: members.to_vec(),
                name: None,
            }
        })
    }

    pub fn buffer(element: &'static Type) -> &'static Type {
        intern(TypeKey::Buffer(addr(element)), || Type {
            tag: TypeTag::Buffer,
            size: RESOURCE_HANDLE_SIZE,
            alignment: RESOURCE_HANDLE_SIZE,
            element: Some(element),
            dimension: 0,
            members: Vec::new(),
            name: None,
        })
    }

    /// A 2D or 3D texture over a scalar storage type.
    pub fn texture(dimension: usize, element: &'static Type) -> &'static Type {
        assert!(dimension == 2 || dimension == 3, "texture dimension must be 2 or 3");
        intern(TypeKey::Texture(addr(element), dimension), || Type {
            tag: TypeTag::Texture,
            size: RESOURCE_HANDLE_SIZE,
            alignment: RESOURCE_HANDLE_SIZE,
            element: Some(element),
            dimension,
            members: Vec::new(),
            name: None,
        })
    }

    pub fn bindless_array() -> &'static Type {
        intern(TypeKey::BindlessArray, || Type {
            tag: TypeTag::BindlessArray,
            size: RESOURCE_HANDLE_SIZE,
            alignment: RESOURCE_HANDLE_SIZE,
            element: None,
            dimension: 0,
            members: Vec::new(),
            name: None,
        })
    }

    pub fn accel() -> &'static Type {
        intern(TypeKey::Accel, || Type {
            tag: TypeTag::Accel,
            size: RESOURCE_HANDLE_SIZE,
            alignment: RESOURCE_HANDLE_SIZE,
            element: None,
            dimension: 0,
            members: Vec::new(),
            name: None,
        })
    }

    /// An opaque host-defined type, identified by its description.
    pub fn custom(name: &str) -> &'static Type {
        intern(TypeKey::Custom(name.to_string()), || Type {
            tag: TypeTag::Custom,
            size: RESOURCE_HANDLE_SIZE,
            alignment: RESOURCE_HANDLE_SIZE,
            element: None,
            dimension: 0,
            members: Vec::new(),
            name: Some(name.to_string()),
        })
    }
}

impl Type {
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn element(&self) -> Option<&'static Type> {
        self.element
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn members(&self) -> &[&'static Type] {
        &self.members
    }

    pub fn description(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Byte offset of the `index`-th structure member.
    pub fn member_offset(&self, index: usize) -> usize {
        assert_eq!(self.tag, TypeTag::Structure, "member_offset on non-structure type");
        assert!(index < self.members.len(), "member index out of range");
        let mut offset = 0usize;
        for m in &self.members[..index] {
            offset = align_up(offset, m.alignment);
            offset += m.size;
        }
        align_up(offset, self.members[index].alignment)
    }

    pub fn is_bool(&self) -> bool {
        self.tag == TypeTag::Bool
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.tag,
            TypeTag::Int8
                | TypeTag::UInt8
                | TypeTag::Int16
                | TypeTag::UInt16
                | TypeTag::Int32
                | TypeTag::UInt32
                | TypeTag::Int64
                | TypeTag::UInt64
        )
    }

    pub fn is_signed(&self) -> bool {
        matches!(self.tag, TypeTag::Int8 | TypeTag::Int16 | TypeTag::Int32 | TypeTag::Int64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self.tag, TypeTag::Float16 | TypeTag::Float32 | TypeTag::Float64)
    }

    pub fn is_scalar(&self) -> bool {
        self.is_bool() || self.is_integer() || self.is_float()
    }

    pub fn is_vector(&self) -> bool {
        self.tag == TypeTag::Vector
    }

    pub fn is_matrix(&self) -> bool {
        self.tag == TypeTag::Matrix
    }

    pub fn is_array(&self) -> bool {
        self.tag == TypeTag::Array
    }

    pub fn is_structure(&self) -> bool {
        self.tag == TypeTag::Structure
    }

    pub fn is_custom(&self) -> bool {
        self.tag == TypeTag::Custom
    }

    pub fn is_resource(&self) -> bool {
        matches!(
            self.tag,
            TypeTag::Buffer | TypeTag::Texture | TypeTag::BindlessArray | TypeTag::Accel | TypeTag::Custom
        )
    }

    /// Process-local identity hash, stable for the lifetime of the
    /// registry.
    pub fn identity_hash(&self) -> u64 {
        self as *const Type as usize as u64
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::Int8 => write!(f, "i8"),
            TypeTag::UInt8 => write!(f, "u8"),
            TypeTag::Int16 => write!(f, "i16"),
            TypeTag::UInt16 => write!(f, "u16"),
            TypeTag::Int32 => write!(f, "i32"),
            TypeTag::UInt32 => write!(f, "u32"),
            TypeTag::Int64 => write!(f, "i64"),
            TypeTag::UInt64 => write!(f, "u64"),
            TypeTag::Float16 => write!(f, "f16"),
            TypeTag::Float32 => write!(f, "f32"),
            TypeTag::Float64 => write!(f, "f64"),
            TypeTag::Vector => write!(f, "vector<{}, {}>", self.element.unwrap(), self.dimension),
            TypeTag::Matrix => write!(f, "matrix<{}, {}>", self.element.unwrap(), self.dimension),
            TypeTag::Array => write!(f, "array<{}, {}>", self.element.unwrap(), self.dimension),
            TypeTag::Structure => {
                write!(f, "struct {{ ")?;
                for (i, m) in self.members.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", m)?;
                }
                write!(f, " }}")
            }
            TypeTag::Buffer => write!(f, "buffer<{}>", self.element.unwrap()),
            TypeTag::Texture => write!(f, "texture{}d<{}>", self.dimension, self.element.unwrap()),
            TypeTag::BindlessArray => write!(f, "bindless_array"),
            TypeTag::Accel => write!(f, "accel"),
            TypeTag::Custom => write!(f, "opaque \"{}\"", self.description()),
        }
    }
}
