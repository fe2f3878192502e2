#[macro_use]
extern crate lumen;
extern crate env_logger;
extern crate rand;

use rand::Rng;

use lumen::prelude::*;
use lumen::video::assets::framebuffer::{Framebuffer, FramebufferAttachments};
use lumen::video::assets::mesh::{Mesh, Primitive};
use lumen::video::assets::shader::{RenderState, Shader, ShaderParams};
use lumen::video::assets::vertex::{Attribute, AttributeLayout};
use lumen::video::command::RenderingCommand;

impl_vertex! {
    Vertex {
        position => [Position; Float; 3; false],
        color => [Color0; UByte; 4; true],
    }
}

const VS: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }";
const FS: &str = "#version 330 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }";

fn shader(command: &RenderingCommand) -> Shader {
    let mut params = ShaderParams::default();
    params.attributes = AttributeLayout::build()
        .with(Attribute::Position, 3)
        .with_optional(Attribute::Color0, 4)
        .finish();
    params.state = RenderState::opaque();

    Shader::new(command, params, VS, FS).unwrap()
}

#[test]
fn arbitrary_payloads_draw() {
    let _ = env_logger::try_init();

    let command = RenderingCommand::headless();
    let shader = shader(&command);
    shader.bind().unwrap();

    let mut rng = rand::thread_rng();
    for _ in 0..64 {
        let num = rng.gen_range(1, 128);
        let verts: Vec<_> = (0..num)
            .map(|_| Vertex::new([rng.gen(), rng.gen(), rng.gen()], [rng.gen(); 4]))
            .collect();

        let num_indices = rng.gen_range(1, 64) * 3;
        let indices: Vec<u32> = (0..num_indices).map(|_| rng.gen_range(0, num as u32)).collect();

        let vbo = command
            .init_vertex_buffer(Vertex::as_bytes(&verts), &Vertex::layout())
            .unwrap();
        let ebo = command.init_element_buffer(&indices).unwrap();
        let vao = command.init_vertex_array(vbo, Some(ebo), &Vertex::layout()).unwrap();
        command
            .draw_elements(vao, Primitive::Triangles, indices.len() as u32)
            .unwrap();

        command.delete_vertex_array(vao).unwrap();
        command.delete_element_buffer(ebo).unwrap();
        command.delete_vertex_buffer(vbo).unwrap();

        let mesh = Mesh::new(
            &command,
            Vertex::layout(),
            Primitive::Triangles,
            Vertex::as_bytes(&verts),
            Some(&indices[..]),
        )
        .unwrap();

        shader.accepts(mesh.layout()).unwrap();
        mesh.draw().unwrap();
    }

    let stats = command.statistics();
    assert_eq!(stats.draw_calls, 128);
    assert_eq!(stats.alive_buffers, 0);
    assert_eq!(stats.alive_vertex_arrays, 0);
}

#[test]
fn rejected_payloads() {
    let command = RenderingCommand::headless();
    let verts = [Vertex::new([0.0; 3], [0; 4]); 3];

    assert!(Mesh::new(&command, Vertex::layout(), Primitive::Triangles, &[], None).is_err());
    assert!(Mesh::new(
        &command,
        Vertex::layout(),
        Primitive::Triangles,
        Vertex::as_bytes(&verts),
        Some(&[0u32, 1, 3][..])
    )
    .is_err());

    let stats = command.statistics();
    assert_eq!(stats.vertex_buffer_uploads, 0);
    assert_eq!(stats.alive_buffers, 0);
}

#[test]
fn compile_failures() {
    let command = RenderingCommand::headless();
    let broken = "#version 330 core\n#error unsupported\n";

    match Shader::new(&command, ShaderParams::default(), VS, broken) {
        Err(Error::Compile { log, .. }) => assert!(log.contains("unsupported")),
        other => panic!("unexpected {:?}", other),
    }

    assert!(Shader::new(&command, ShaderParams::default(), "", FS).is_err());
    assert_eq!(command.statistics().alive_shader_programs, 0);

    let shader = shader(&command);
    assert_eq!(command.statistics().alive_shader_programs, 1);
    drop(shader);
    assert_eq!(command.statistics().alive_shader_programs, 0);
}

#[test]
fn state_toggles() {
    let command = RenderingCommand::headless();
    for _ in 0..2 {
        command.set_polygon_mode(PolygonMode::Lines).unwrap();
        command.set_depth_test(true, Some(Comparison::Less)).unwrap();
        command.set_blend(None).unwrap();
        command.apply_render_state(&RenderState::transparent()).unwrap();
    }

    let other = RenderingCommand::headless();
    assert!(command.same_backend(&command.clone()));
    assert!(!command.same_backend(&other));
    assert_eq!(command.capabilities().name, "Headless");
}

#[test]
fn consecutive_resizes() {
    let command = RenderingCommand::headless();
    let mut fb = Framebuffer::new(
        &command,
        Vector2::new(16, 16),
        FramebufferAttachments::default(),
    )
    .unwrap();

    let mut prev = Vec::new();
    for i in 1..=16 {
        prev.push(fb.handle());
        let dimensions = Vector2::new(16 + i * 8, 16 + i * 4);
        fb.resize(dimensions).unwrap();

        assert_eq!(fb.dimensions(), dimensions);
        assert_eq!(command.framebuffer_dimensions(fb.handle()).unwrap(), dimensions);
        assert!(command.bind_texture(0, fb.color_attachment()).is_ok());
    }

    for v in prev {
        assert!(command.framebuffer_dimensions(v).is_err());
    }

    let stats = command.statistics();
    assert_eq!(stats.framebuffer_allocations, 17);
    assert_eq!(stats.framebuffer_releases, 16);
    assert_eq!(stats.alive_framebuffers, 1);

    drop(fb);
    assert_eq!(command.statistics().alive_framebuffers, 0);
}
