//! The shaders and meshes the renderer draws with.

use lumen::errors::*;
use lumen::video::assets::mesh::{Mesh, Primitive};
use lumen::video::assets::shader::{CullFace, RenderState, Shader, ShaderParams};
use lumen::video::assets::vertex::{Attribute, AttributeLayout};
use lumen::video::command::RenderingCommand;

use crate::model::primitives::{self, GridVertex, ScreenVertex};

/// Built-in shader programs.
pub struct Shaders {
    /// Phong shading with scene lights.
    pub lit: Shader,
    /// Material base color times the diffuse texture.
    pub unlit: Shader,
    pub grid: Shader,
    /// Copies a texture to the screen.
    pub screen: Shader,
}

impl Shaders {
    pub fn new(command: &RenderingCommand) -> Result<Self> {
        let attributes = AttributeLayout::build()
            .with(Attribute::Position, 3)
            .with(Attribute::Normal, 3)
            .with(Attribute::Texcoord0, 2)
            .with_optional(Attribute::Tangent, 3)
            .with_optional(Attribute::Bitangent, 3)
            .finish();

        let mut params = ShaderParams::default();
        params.attributes = attributes;
        params.state = RenderState::opaque();

        let lit = Shader::new(
            command,
            params.clone(),
            include_str!("shaders/lit.vs"),
            include_str!("shaders/lit.fs"),
        )?;

        let unlit = Shader::new(
            command,
            params,
            include_str!("shaders/lit.vs"),
            include_str!("shaders/unlit.fs"),
        )?;

        let mut params = ShaderParams::default();
        params.attributes = AttributeLayout::build()
            .with(Attribute::Position, 3)
            .finish();
        params.state = RenderState::transparent();

        let grid = Shader::new(
            command,
            params,
            include_str!("shaders/grid.vs"),
            include_str!("shaders/grid.fs"),
        )?;

        let mut params = ShaderParams::default();
        params.attributes = AttributeLayout::build()
            .with(Attribute::Position, 2)
            .with(Attribute::Texcoord0, 2)
            .finish();
        params.state.cull_face = CullFace::Nothing;

        let screen = Shader::new(
            command,
            params,
            include_str!("shaders/screen.vs"),
            include_str!("shaders/screen.fs"),
        )?;

        Ok(Shaders {
            lit,
            unlit,
            grid,
            screen,
        })
    }
}

/// Lines on the XZ plane, spaced `spacing` apart out to `half_extent`.
pub fn grid(command: &RenderingCommand, half_extent: f32, spacing: f32) -> Result<Mesh> {
    let verts = primitives::grid(half_extent, spacing);
    Mesh::new(
        command,
        GridVertex::layout(),
        Primitive::Lines,
        GridVertex::as_bytes(&verts),
        None,
    )
}

/// A triangle strip covering the whole viewport.
pub fn screen_quad(command: &RenderingCommand) -> Result<Mesh> {
    let verts = primitives::screen_quad();
    Mesh::new(
        command,
        ScreenVertex::layout(),
        Primitive::TriangleStrip,
        ScreenVertex::as_bytes(&verts),
        None,
    )
}
