//! Linked shader programs and the render state they are drawn with.

use std::fs;
use std::path::Path;

use crate::errors::*;
use crate::math::prelude::{Color, Matrix3, Matrix4, Vector2, Vector3, Vector4};

use super::super::api::ShaderProgramHandle;
use super::super::command::RenderingCommand;
use super::vertex::{AttributeLayout, VertexLayout};

/// Specify whether front- or back-facing polygons can be culled.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum CullFace {
    Nothing,
    Front,
    Back,
}

/// A pixel-wise comparison function.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Comparison {
    Never,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    Always,
}

/// Specifies how incoming RGBA values (source) and the RGBA in framebuffer (destination)
/// are combined.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Equation {
    Add,
    Subtract,
    ReverseSubtract,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum BlendValue {
    SourceColor,
    SourceAlpha,
    DestinationColor,
    DestinationAlpha,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum BlendFactor {
    Zero,
    One,
    Value(BlendValue),
    OneMinusValue(BlendValue),
}

/// The fixed-function states a shader program is drawn with.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct RenderState {
    pub cull_face: CullFace,
    /// `None` disables the depth test.
    pub depth_test: Option<Comparison>,
    pub depth_write: bool,
    pub color_blend: Option<(Equation, BlendFactor, BlendFactor)>,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            cull_face: CullFace::Nothing,
            depth_test: None,
            depth_write: false,
            color_blend: None,
        }
    }
}

impl RenderState {
    /// Depth tested and depth written opaque geometry.
    pub fn opaque() -> Self {
        RenderState {
            depth_test: Some(Comparison::Less),
            depth_write: true,
            ..Default::default()
        }
    }

    /// Standard alpha blending on top of depth tested geometry.
    pub fn transparent() -> Self {
        RenderState {
            depth_test: Some(Comparison::LessOrEqual),
            depth_write: false,
            color_blend: Some((
                Equation::Add,
                BlendFactor::Value(BlendValue::SourceAlpha),
                BlendFactor::OneMinusValue(BlendValue::SourceAlpha),
            )),
            ..Default::default()
        }
    }
}

/// Uniform variable of a shader program. Matrices are supplied in column major
/// order, the way `cgmath` stores them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    I32(i32),
    F32(f32),
    Vector2f([f32; 2]),
    Vector3f([f32; 3]),
    Vector4f([f32; 4]),
    Matrix3f([[f32; 3]; 3]),
    Matrix4f([[f32; 4]; 4]),
}

impl From<i32> for UniformVariable {
    fn from(v: i32) -> Self {
        UniformVariable::I32(v)
    }
}

impl From<bool> for UniformVariable {
    fn from(v: bool) -> Self {
        UniformVariable::I32(v as i32)
    }
}

impl From<f32> for UniformVariable {
    fn from(v: f32) -> Self {
        UniformVariable::F32(v)
    }
}

impl From<[f32; 2]> for UniformVariable {
    fn from(v: [f32; 2]) -> Self {
        UniformVariable::Vector2f(v)
    }
}

impl From<[f32; 3]> for UniformVariable {
    fn from(v: [f32; 3]) -> Self {
        UniformVariable::Vector3f(v)
    }
}

impl From<[f32; 4]> for UniformVariable {
    fn from(v: [f32; 4]) -> Self {
        UniformVariable::Vector4f(v)
    }
}

impl From<Vector2<f32>> for UniformVariable {
    fn from(v: Vector2<f32>) -> Self {
        UniformVariable::Vector2f(*v.as_ref())
    }
}

impl From<Vector3<f32>> for UniformVariable {
    fn from(v: Vector3<f32>) -> Self {
        UniformVariable::Vector3f(*v.as_ref())
    }
}

impl From<Vector4<f32>> for UniformVariable {
    fn from(v: Vector4<f32>) -> Self {
        UniformVariable::Vector4f(*v.as_ref())
    }
}

impl From<Color> for UniformVariable {
    fn from(v: Color) -> Self {
        UniformVariable::Vector4f(v.rgba())
    }
}

impl From<Matrix3<f32>> for UniformVariable {
    fn from(v: Matrix3<f32>) -> Self {
        UniformVariable::Matrix3f(*v.as_ref())
    }
}

impl From<Matrix4<f32>> for UniformVariable {
    fn from(v: Matrix4<f32>) -> Self {
        UniformVariable::Matrix4f(*v.as_ref())
    }
}

/// The setup parameters of a shader program.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct ShaderParams {
    /// Ordered vertex inputs; location `i` is the `i`-th attribute.
    pub attributes: AttributeLayout,
    pub state: RenderState,
}

/// A linked shader program.
///
/// A `Shader` is either fully linked or never constructed: compile and link
/// failures are returned as errors and every intermediate stage is released. The
/// program itself is released when the `Shader` is dropped.
pub struct Shader {
    command: RenderingCommand,
    program: ShaderProgramHandle,
    params: ShaderParams,
}

impl Shader {
    pub fn new(command: &RenderingCommand, params: ShaderParams, vs: &str, fs: &str) -> Result<Self> {
        let vs = command.init_vertex_shader(vs)?;
        let fs = match command.init_fragment_shader(fs) {
            Ok(fs) => fs,
            Err(err) => {
                Self::release_stage(command, vs);
                return Err(err);
            }
        };

        let program = command.init_shader_program(vs, fs);
        Self::release_stage(command, vs);
        Self::release_stage(command, fs);

        let program = program?;
        debug!("Created shader program {}.", program);

        Ok(Shader {
            command: command.clone(),
            program,
            params,
        })
    }

    /// Reads the sources of both stages from disk and builds a program out of them.
    pub fn from_files<P1, P2>(
        command: &RenderingCommand,
        params: ShaderParams,
        vs: P1,
        fs: P2,
    ) -> Result<Self>
    where
        P1: AsRef<Path>,
        P2: AsRef<Path>,
    {
        let vs = read_source(vs.as_ref())?;
        let fs = read_source(fs.as_ref())?;
        Self::new(command, params, &vs, &fs)
    }

    fn release_stage(command: &RenderingCommand, stage: super::super::api::ShaderStageHandle) {
        if let Err(err) = command.delete_shader_stage(stage) {
            warn!("Failed to release shader stage {}. {}", stage, err);
        }
    }

    /// The numeric id of the underlying program.
    #[inline]
    pub fn id(&self) -> ShaderProgramHandle {
        self.program
    }

    #[inline]
    pub fn params(&self) -> &ShaderParams {
        &self.params
    }

    /// Makes this program current and applies its render state.
    pub fn bind(&self) -> Result<()> {
        self.command.use_program(self.program)?;
        self.command.apply_render_state(&self.params.state)
    }

    #[inline]
    pub fn set_uniform<T: Into<UniformVariable>>(&self, name: &str, variable: T) -> Result<()> {
        self.command.set_uniform(self.program, name, variable)
    }

    /// Checks that a vertex layout feeds every input of this program.
    #[inline]
    pub fn accepts(&self, layout: &VertexLayout) -> Result<()> {
        layout.validate(&self.params.attributes)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if let Err(err) = self.command.delete_shader_program(self.program) {
            warn!("Failed to release shader program {}. {}", self.program, err);
        }
    }
}

impl ::std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.debug_struct("Shader")
            .field("program", &self.program)
            .field("params", &self.params)
            .finish()
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| Error::ResourceLoad {
        path: path.to_owned(),
        reason: format!("{}", err),
    })
}

#[cfg(test)]
mod test {
    use super::super::vertex::{Attribute, VertexFormat};
    use super::*;

    const VS: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }";
    const FS: &str = "#version 330 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }";

    #[test]
    fn create() {
        let command = RenderingCommand::headless();
        let shader = Shader::new(&command, ShaderParams::default(), VS, FS).unwrap();
        assert!(shader.bind().is_ok());
        assert!(shader.set_uniform("u_Value", 1.0f32).is_ok());
        assert_eq!(command.statistics().alive_shader_programs, 1);

        drop(shader);
        assert_eq!(command.statistics().alive_shader_programs, 0);
    }

    #[test]
    fn compile_failure() {
        let command = RenderingCommand::headless();
        let broken = "#version 330 core\n#error unsupported\n";

        match Shader::new(&command, ShaderParams::default(), VS, broken) {
            Err(Error::Compile { log, .. }) => assert!(log.contains("unsupported")),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(command.statistics().alive_shader_programs, 0);
    }

    #[test]
    fn missing_file() {
        let command = RenderingCommand::headless();
        let err = Shader::from_files(
            &command,
            ShaderParams::default(),
            "does/not/exist.vs",
            "does/not/exist.fs",
        )
        .unwrap_err();

        match err {
            Error::ResourceLoad { .. } => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn accepts() {
        let command = RenderingCommand::headless();
        let mut params = ShaderParams::default();
        params.attributes = AttributeLayout::build()
            .with(Attribute::Position, 3)
            .with(Attribute::Normal, 3)
            .finish();
        let shader = Shader::new(&command, params, VS, FS).unwrap();

        let positions = VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Float, 3, false)
            .finish();
        assert!(shader.accepts(&positions).is_err());

        let lit = VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Float, 3, false)
            .with(Attribute::Normal, VertexFormat::Float, 3, false)
            .finish();
        assert!(shader.accepts(&lit).is_ok());
    }
}
