extern crate env_logger;
extern crate lumen;
extern crate lumen_world;

use lumen::prelude::*;
use lumen_world::prelude::*;
use lumen_world::transform::Transform;

fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let settings = Settings::default();
    let mut context = GraphicsContext::headless(settings.window.size);
    let command = RenderingCommand::headless();

    let loader = ModelLoader::new(
        &command,
        Box::new(ObjImporter::new()),
        settings.resources.eviction,
    );

    let mut manager = SceneManager::new(loader, settings.scene, settings.lighting);
    manager.load_default_scene()?;

    let model = manager.loader_mut().load_shape(Shape::Cube)?;
    if let Some(scene) = manager.active_scene_mut() {
        let mut transform = Transform::default();
        transform.position = Vector3::new(0.0, 0.5, 0.0);
        scene.add_object(SceneObject::new("box", model).with_transform(transform))?;
    }

    let mut renderer = Renderer::new(&command, settings.renderer, context.dimensions())?;
    context.resize((640, 360));

    for frame in 0..4 {
        for event in context.poll_events() {
            renderer.handle_event(&event);
        }

        let info = renderer.render_frame(&manager)?;
        renderer.present(&context)?;

        println!(
            "frame {}: {} draw calls, {} objects drawn ({:?})",
            frame,
            info.draw_calls,
            info.drawn,
            renderer.viewport()
        );
    }

    println!("{:#?}", command.statistics());
    Ok(())
}
