use std::path::PathBuf;

/// The stage of a shader program that failed to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ::std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Failed to compile {} shader, errors: \n{}.", stage, log)]
    Compile { stage: ShaderStage, log: String },
    #[fail(display = "Failed to link shader program, errors: \n{}.", _0)]
    Link(String),
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
    #[fail(display = "{} is invalid.", _0)]
    HandleInvalid(String),
    #[fail(display = "Vertex layout mismatch: {}", _0)]
    VertexLayout(String),
    #[fail(display = "Failed to load {:?}: {}", path, reason)]
    ResourceLoad { path: PathBuf, reason: String },
    #[fail(display = "Too many {} (limit is {}).", what, limit)]
    CapacityExceeded { what: &'static str, limit: usize },
    #[fail(display = "Failed to swap scene, the previous one stays active: {}", _0)]
    SceneSwap(String),
    #[fail(display = "Context: {}", _0)]
    Context(String),
    #[fail(display = "Malformed descriptor: {}", _0)]
    Descriptor(String),
    #[fail(display = "Renderer is at stage {}, expected {}.", actual, expected)]
    FrameStage {
        expected: &'static str,
        actual: &'static str,
    },
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    /// Returns true if this error comes from the native graphics API.
    pub fn is_backend(&self) -> bool {
        match *self {
            Error::Compile { .. }
            | Error::Link(_)
            | Error::Backend(_)
            | Error::HandleInvalid(_)
            | Error::VertexLayout(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error should terminate the render loop. Everything else
    /// is contained at the resource that produced it.
    pub fn is_fatal(&self) -> bool {
        match *self {
            Error::Context(_) => true,
            _ => false,
        }
    }

    pub(crate) fn invalid<T: ::std::fmt::Display>(handle: T) -> Self {
        Error::HandleInvalid(format!("{}", handle))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Descriptor(format!("{}", err))
    }
}

#[cfg(feature = "glutin-window")]
impl From<glutin::CreationError> for Error {
    fn from(err: glutin::CreationError) -> Error {
        Error::Context(format!("{}", err))
    }
}

#[cfg(feature = "glutin-window")]
impl From<glutin::ContextError> for Error {
    fn from(err: glutin::ContextError) -> Error {
        Error::Context(format!("{}", err))
    }
}
