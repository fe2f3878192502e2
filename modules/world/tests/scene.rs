extern crate env_logger;
extern crate lumen;
extern crate lumen_world;

use lumen::prelude::*;
use lumen_world::prelude::*;
use lumen_world::transform::Transform;

fn manager(command: &RenderingCommand) -> SceneManager {
    let loader = ModelLoader::new(command, Box::new(ObjImporter::new()), EvictionPolicy::Never);
    SceneManager::new(loader, SceneParams::default(), LightingParams::default())
}

fn descriptor() -> SceneDescriptor {
    let mut desc = SceneDescriptor::default();
    desc.name = "boxes".into();
    desc.cameras.push(CameraDescriptor {
        name: "top".into(),
        camera: Camera::new(Vector3::new(0.0, 40.0, 0.0)),
    });

    desc.lights.push(Light::directional("sun", Vector3::new(-0.2, -1.0, -0.3)));
    for i in 0..3 {
        let mut transform = Transform::from_position(Vector3::new(i as f32 * 2.0, 0.0, 0.0));
        transform.set_euler_angles(0.0, 45.0 * i as f32, 0.0);

        desc.objects.push(ObjectDescriptor {
            name: format!("box{}", i),
            source: Some(ModelSource::Shape(Shape::Cube)),
            transform,
            ..Default::default()
        });
    }

    desc
}

#[test]
fn failing_swap_keeps_scene() {
    let _ = env_logger::try_init();

    let command = RenderingCommand::headless();
    let mut manager = manager(&command);
    manager.load_scene(&descriptor()).unwrap();

    let before = manager.save_scene().unwrap();
    let len = manager.active_scene().unwrap().len();
    let camera = *manager.active_scene().unwrap().active_camera().unwrap();

    let mut broken = descriptor();
    for i in 0..MAX_LIGHTS {
        broken.lights.push(Light::point(
            format!("lamp{}", i),
            Vector3::new(i as f32, 1.0, 0.0),
            Attenuation::default(),
        ));
    }

    match manager.load_scene(&broken) {
        Err(Error::SceneSwap(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    let scene = manager.active_scene().unwrap();
    assert_eq!(scene.len(), len);
    assert_eq!(scene.active_camera(), Some(&camera));
    assert_eq!(manager.save_scene().unwrap(), before);
    assert_eq!(manager.generation(), 1);
}

#[test]
fn descriptor_round_trip() {
    let command = RenderingCommand::headless();
    let mut manager = manager(&command);
    manager.load_scene(&descriptor()).unwrap();

    {
        let scene = manager.active_scene_mut().unwrap();
        let handle = scene.find("box1").unwrap();
        assert!(scene.set_active(handle, false));
        scene.set_grid_enabled(false);
        scene.lighting_mut().set_active("sun", false);
    }

    let saved = manager.save_scene().unwrap();
    let json = saved.to_json().unwrap();
    let bytes = saved.to_bytes().unwrap();
    assert_eq!(SceneDescriptor::from_bytes(&bytes).unwrap(), saved);

    manager.load_scene(&SceneDescriptor::from_json(&json).unwrap()).unwrap();
    let scene = manager.active_scene().unwrap();
    assert_eq!(scene.len(), 3);
    assert!(!scene.grid_enabled());
    assert!(!scene.object(scene.find("box1").unwrap()).unwrap().is_active());
    assert!(!scene.lighting().get("sun").unwrap().active);
    assert_eq!(scene.active_camera_name(), Some("top"));
    assert_eq!(manager.save_scene().unwrap(), saved);
}

#[test]
fn lighting_capacity() {
    let mut lighting = Lighting::new();
    for i in 0..16 {
        let light = Light::point(format!("lamp{}", i), Vector3::new(0.0, i as f32, 0.0), Attenuation::default());
        assert!(lighting.add_light(light).is_ok());
    }

    let extra = Light::point("lamp16", Vector3::new(0.0, 0.0, 0.0), Attenuation::default());
    match lighting.add_light(extra.clone()) {
        Err(Error::CapacityExceeded { limit, .. }) => assert_eq!(limit, 16),
        other => panic!("unexpected {:?}", other),
    }

    assert!(lighting.get("lamp16").is_none());
    assert!(lighting.remove_light("lamp3").is_some());
    assert!(lighting.remove_light("lamp3").is_none());
    assert!(lighting.add_light(extra).is_ok());
    assert_eq!(lighting.len(), 16);
}

#[test]
fn attenuation_by_source() {
    let sun = Light::directional("sun", Vector3::new(0.0, -2.0, 0.0));
    assert!(sun.is_directional());
    assert!(sun.attenuation().is_none());

    let lamp = Light::point("lamp", Vector3::new(1.0, 2.0, 3.0), Attenuation::default());
    assert!(!lamp.is_directional());
    assert_eq!(lamp.attenuation(), Some(Attenuation::default()));

    let mut lighting = Lighting::new();
    lighting.add_light(sun).unwrap();
    lighting.add_light(lamp).unwrap();
    assert_eq!(lighting.active_counts(), (1, 1));
}

#[test]
fn stable_handles() {
    let command = RenderingCommand::headless();
    let mut manager = manager(&command);
    manager.load_scene(&descriptor()).unwrap();

    let scene = manager.active_scene_mut().unwrap();
    let first = scene.find("box0").unwrap();
    let last = scene.find("box2").unwrap();

    let middle = scene.find("box1").unwrap();
    let object = scene.remove_object(middle).unwrap();
    assert!(object.model().is_some());

    assert_eq!(&*scene.object(first).unwrap().name, "box0");
    assert_eq!(&*scene.object(last).unwrap().name, "box2");
    assert!(scene.object(middle).is_none());

    let again = scene.add_object(object).unwrap();
    assert_ne!(again, middle);
    let names: Vec<_> = scene.objects().map(|(_, v)| v.name.to_string()).collect();
    assert_eq!(names, vec!["box0", "box2", "box1"]);
}
