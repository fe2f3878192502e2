//! Vertex attribute layouts.
//!
//! A `VertexLayout` is an ordered list of attributes: the `i`-th element is bound to
//! shader input location `i`. The backend has no way to type-check that binding, so
//! meshes validate their layout against the shader's `AttributeLayout` before any
//! draw is submitted.

use smallvec::SmallVec;

use crate::errors::*;

pub const MAX_VERTEX_ATTRIBUTES: usize = 8;

/// Semantic of a vertex attribute.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Position,
    Normal,
    Texcoord0,
    Tangent,
    Bitangent,
    Color0,
}

impl Into<&'static str> for Attribute {
    fn into(self) -> &'static str {
        match self {
            Attribute::Position => "Position",
            Attribute::Normal => "Normal",
            Attribute::Texcoord0 => "Texcoord0",
            Attribute::Tangent => "Tangent",
            Attribute::Bitangent => "Bitangent",
            Attribute::Color0 => "Color0",
        }
    }
}

/// The data type in the vertex component.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum VertexFormat {
    Byte,
    UByte,
    Short,
    UShort,
    Float,
}

impl VertexFormat {
    #[inline]
    pub fn size(self) -> u8 {
        match self {
            VertexFormat::Byte | VertexFormat::UByte => 1,
            VertexFormat::Short | VertexFormat::UShort => 2,
            VertexFormat::Float => 4,
        }
    }
}

/// The details of a vertex attribute.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct VertexAttribute {
    pub name: Attribute,
    /// The data type of each component of this element.
    pub format: VertexFormat,
    /// The number of components per generic vertex element.
    pub size: u8,
    /// Whether fixed-point data values should be normalized.
    pub normalized: bool,
    /// Relative offset of this element in a single vertex.
    pub offset: u8,
}

/// `VertexLayout` defines how a single vertex structure looks like.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct VertexLayout {
    stride: u8,
    elements: SmallVec<[VertexAttribute; MAX_VERTEX_ATTRIBUTES]>,
}

impl VertexLayout {
    #[inline]
    pub fn build() -> VertexLayoutBuilder {
        VertexLayoutBuilder::new()
    }

    /// Stride of single vertex structure.
    #[inline]
    pub fn stride(&self) -> u8 {
        self.stride
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates attributes in location order.
    #[inline]
    pub fn iter(&self) -> ::std::slice::Iter<VertexAttribute> {
        self.elements.iter()
    }

    /// Returns the location and description of attribute `name`.
    pub fn element(&self, name: Attribute) -> Option<(usize, VertexAttribute)> {
        self.elements
            .iter()
            .enumerate()
            .find(|(_, v)| v.name == name)
            .map(|(i, v)| (i, *v))
    }

    /// Relative element offset from the layout.
    #[inline]
    pub fn offset(&self, name: Attribute) -> Option<u8> {
        self.element(name).map(|(_, v)| v.offset)
    }

    /// Returns the number of complete vertices in `bytes`, or an error if the
    /// buffer is not a whole multiple of the stride.
    pub fn num_vertices(&self, bytes: usize) -> Result<usize> {
        if self.stride == 0 {
            return Err(Error::VertexLayout("the layout has no attributes.".into()));
        }

        let stride = self.stride as usize;
        if bytes % stride != 0 {
            return Err(Error::VertexLayout(format!(
                "{} bytes of vertex data is not a multiple of stride {}.",
                bytes, stride
            )));
        }

        Ok(bytes / stride)
    }

    /// Checks that every input declared by `attributes` is fed from the same location
    /// of this layout with at least as many components.
    pub fn validate(&self, attributes: &AttributeLayout) -> Result<()> {
        for (location, input) in attributes.iter().enumerate() {
            match self.elements.get(location) {
                Some(element) if element.name == input.name => {
                    if element.size < input.size {
                        return Err(Error::VertexLayout(format!(
                            "attribute {:?} has {} components, shader expects {}.",
                            input.name, element.size, input.size
                        )));
                    }
                }
                Some(element) => {
                    return Err(Error::VertexLayout(format!(
                        "location {} holds {:?}, shader expects {:?}.",
                        location, element.name, input.name
                    )));
                }
                None if input.required => {
                    return Err(Error::VertexLayout(format!(
                        "can't find attribute {:?} in vertex layout.",
                        input.name
                    )));
                }
                None => {}
            }
        }

        Ok(())
    }
}

/// Helper structure to build a vertex layout. Elements are packed in the
/// order they are declared.
#[derive(Default)]
pub struct VertexLayoutBuilder(VertexLayout);

impl VertexLayoutBuilder {
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends an attribute, or rewrites it in place if it was declared already.
    pub fn with(
        &mut self,
        name: Attribute,
        format: VertexFormat,
        size: u8,
        normalized: bool,
    ) -> &mut Self {
        self.with_offset(name, format, size, normalized, None)
    }

    #[doc(hidden)]
    pub fn with_offset(
        &mut self,
        name: Attribute,
        format: VertexFormat,
        size: u8,
        normalized: bool,
        offset: Option<u8>,
    ) -> &mut Self {
        assert!(size > 0 && size <= 4);

        let desc = VertexAttribute {
            name,
            format,
            size,
            normalized,
            offset: offset.unwrap_or(0),
        };

        if let Some(v) = self.0.elements.iter_mut().find(|v| v.name == name) {
            *v = desc;
            return self;
        }

        assert!(self.0.elements.len() < MAX_VERTEX_ATTRIBUTES);
        self.0.elements.push(desc);
        self
    }

    /// Finishes the layout with tightly packed offsets.
    pub fn finish(&mut self) -> VertexLayout {
        let mut stride = 0;
        for v in self.0.elements.iter_mut() {
            v.offset = stride;
            stride += v.size * v.format.size();
        }

        self.0.stride = stride;
        self.0.clone()
    }

    /// Finishes the layout keeping explicit offsets and stride, used for `#[repr(C)]`
    /// vertex structs.
    #[doc(hidden)]
    pub fn finish_with_stride(&mut self, stride: u8) -> VertexLayout {
        self.0.stride = stride;
        self.0.clone()
    }
}

/// An input declared by a shader program.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct AttributeInput {
    pub name: Attribute,
    pub size: u8,
    pub required: bool,
}

/// The ordered inputs of a shader program; location `i` is the `i`-th input.
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct AttributeLayout {
    inputs: SmallVec<[AttributeInput; MAX_VERTEX_ATTRIBUTES]>,
}

impl AttributeLayout {
    #[inline]
    pub fn build() -> AttributeLayoutBuilder {
        AttributeLayoutBuilder::new()
    }

    #[inline]
    pub fn iter(&self) -> ::std::slice::Iter<AttributeInput> {
        self.inputs.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

#[derive(Default)]
pub struct AttributeLayoutBuilder(AttributeLayout);

impl AttributeLayoutBuilder {
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with(&mut self, name: Attribute, size: u8) -> &mut Self {
        self.push(name, size, true)
    }

    pub fn with_optional(&mut self, name: Attribute, size: u8) -> &mut Self {
        self.push(name, size, false)
    }

    fn push(&mut self, name: Attribute, size: u8, required: bool) -> &mut Self {
        assert!(size > 0 && size <= 4);
        assert!(self.0.inputs.len() < MAX_VERTEX_ATTRIBUTES);
        self.0.inputs.push(AttributeInput {
            name,
            size,
            required,
        });
        self
    }

    #[inline]
    pub fn finish(&mut self) -> AttributeLayout {
        self.0.clone()
    }
}

/// Reinterprets a slice of plain vertex or index values as bytes.
pub fn as_bytes<T: Copy>(values: &[T]) -> &[u8] {
    let len = values.len() * ::std::mem::size_of::<T>();
    unsafe { ::std::slice::from_raw_parts(values.as_ptr() as *const u8, len) }
}

#[macro_use]
pub mod macros {
    #[macro_export]
    macro_rules! impl_vertex {
        ($name: ident { $($field: ident => [$attribute: tt; $format: tt; $size: tt; $normalized: tt],)* }) => (
            #[repr(C)]
            #[derive(Debug, Copy, Clone, PartialEq)]
            pub struct $name {
                $(pub $field: $crate::impl_vertex_field!{$format, $size}, )*
            }

            impl $name {
                #[allow(clippy::too_many_arguments)]
                pub fn new($($field: $crate::impl_vertex_field!{$format, $size}, ) *) -> Self {
                    $name {
                        $($field,)*
                    }
                }

                pub fn layout() -> $crate::video::assets::vertex::VertexLayout {
                    let mut builder = $crate::video::assets::vertex::VertexLayoutBuilder::new();
                    let uninit = ::std::mem::MaybeUninit::<$name>::uninit();
                    let base = uninit.as_ptr();

                    $(
                        let offset = unsafe {
                            ::std::ptr::addr_of!((*base).$field) as usize - base as usize
                        };

                        builder.with_offset(
                            $crate::video::assets::vertex::Attribute::$attribute,
                            $crate::video::assets::vertex::VertexFormat::$format,
                            $size,
                            $normalized,
                            Some(offset as u8));
                    ) *

                    builder.finish_with_stride(::std::mem::size_of::<$name>() as u8)
                }

                #[inline]
                pub fn as_bytes(values: &[Self]) -> &[u8] {
                    $crate::video::assets::vertex::as_bytes(values)
                }
            }
        )
    }

    #[macro_export]
    macro_rules! impl_vertex_field {
        (Byte, $size: tt) => ([i8; $size]);
        (UByte, $size: tt) => ([u8; $size]);
        (Short, $size: tt) => ([i16; $size]);
        (UShort, $size: tt) => ([u16; $size]);
        (Float, $size: tt) => ([f32; $size]);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic() {
        let layout = VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Float, 3, false)
            .with(Attribute::Texcoord0, VertexFormat::Float, 2, false)
            .finish();

        assert_eq!(layout.stride(), 20);
        assert_eq!(layout.offset(Attribute::Position), Some(0));
        assert_eq!(layout.offset(Attribute::Texcoord0), Some(12));
        assert_eq!(layout.offset(Attribute::Normal), None);
        assert_eq!(layout.element(Attribute::Texcoord0).unwrap().0, 1);
    }

    #[test]
    fn rewrite() {
        let layout = VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Byte, 1, false)
            .with(Attribute::Texcoord0, VertexFormat::Float, 2, true)
            .with(Attribute::Position, VertexFormat::Float, 3, true)
            .finish();

        assert_eq!(layout.stride(), 20);
        assert_eq!(layout.len(), 2);
        let (location, element) = layout.element(Attribute::Position).unwrap();
        assert_eq!(location, 0);
        assert_eq!(element.format, VertexFormat::Float);
        assert_eq!(element.size, 3);
    }

    #[test]
    fn num_vertices() {
        let layout = VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Float, 3, false)
            .finish();

        assert_eq!(layout.num_vertices(36).unwrap(), 3);
        assert!(layout.num_vertices(35).is_err());
        assert!(VertexLayout::default().num_vertices(0).is_err());
    }

    #[test]
    fn validate() {
        let layout = VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Float, 3, false)
            .with(Attribute::Normal, VertexFormat::Float, 3, false)
            .finish();

        let lit = AttributeLayout::build()
            .with(Attribute::Position, 3)
            .with(Attribute::Normal, 3)
            .with_optional(Attribute::Texcoord0, 2)
            .finish();
        assert!(layout.validate(&lit).is_ok());

        let textured = AttributeLayout::build()
            .with(Attribute::Position, 3)
            .with(Attribute::Texcoord0, 2)
            .finish();
        assert!(layout.validate(&textured).is_err());

        let wide = AttributeLayout::build().with(Attribute::Position, 4).finish();
        assert!(layout.validate(&wide).is_err());
    }

    impl_vertex! {
        Vertex {
            position => [Position; Float; 3; false],
            color => [Color0; UByte; 4; true],
            texcoord => [Texcoord0; Float; 2; false],
        }
    }

    #[test]
    fn custom_vertex() {
        let layout = Vertex::layout();
        assert_eq!(layout.stride() as usize, ::std::mem::size_of::<Vertex>());
        assert_eq!(layout.offset(Attribute::Position), Some(0));
        assert_eq!(layout.offset(Attribute::Color0), Some(12));
        assert_eq!(layout.offset(Attribute::Texcoord0), Some(16));

        let vertices = [Vertex::new([0.0; 3], [255; 4], [1.0; 2])];
        assert_eq!(Vertex::as_bytes(&vertices).len(), 24);
    }
}
