extern crate env_logger;
extern crate image;
extern crate lumen;
extern crate lumen_world;

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use lumen::prelude::*;
use lumen_world::prelude::*;

const OBJ: &str = "mtllib shared.mtl
o tri
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
usemtl shared
f 1/1/1 2/2/1 3/3/1
";

const MTL: &str = "newmtl shared
Kd 1 1 1
Ks 0.5 0.5 0.5
Ns 32
map_Kd brick.png
map_Ks brick.png
";

/// Writes two models sharing one material library and image into a fresh
/// directory.
fn fixture(name: &str) -> PathBuf {
    let dir = ::std::env::temp_dir().join(format!("lumen-world-{}-{}", name, ::std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();

    fs::write(dir.join("a.obj"), OBJ).unwrap();
    fs::write(dir.join("b.obj"), OBJ).unwrap();
    fs::write(dir.join("shared.mtl"), MTL).unwrap();
    image::RgbaImage::new(2, 2).save(dir.join("brick.png")).unwrap();
    dir
}

fn loader(command: &RenderingCommand, policy: EvictionPolicy) -> ModelLoader {
    ModelLoader::new(command, Box::new(ObjImporter::new()), policy)
}

#[test]
fn shared_texture_uploads_once() {
    let _ = env_logger::try_init();

    let dir = fixture("shared");
    let command = RenderingCommand::headless();
    let mut loader = loader(&command, EvictionPolicy::Never);

    let a = loader.load_model(dir.join("a.obj")).unwrap();
    let b = loader.load_model(dir.join("b.obj")).unwrap();

    assert_eq!(command.statistics().texture_uploads, 1);
    assert!(loader.cache().contains(dir.join("brick.png")));

    let diffuse = a.meshes()[0].texture(TextureKind::Diffuse).unwrap();
    let specular = b.meshes()[0].texture(TextureKind::Specular).unwrap();
    assert!(Rc::ptr_eq(diffuse, specular));
    assert_eq!(a.meshes()[0].mesh.num_indices(), 3);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn broken_models_are_discarded() {
    let dir = fixture("broken");
    fs::remove_file(dir.join("brick.png")).unwrap();

    let command = RenderingCommand::headless();
    let mut loader = loader(&command, EvictionPolicy::Never);

    match loader.load_model(dir.join("a.obj")) {
        Err(Error::ResourceLoad { .. }) => {}
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }

    assert!(loader.load_model(dir.join("missing.obj")).is_err());

    let stats = command.statistics();
    assert_eq!(stats.alive_buffers, 0);
    assert_eq!(stats.alive_textures, 0);
    assert!(loader.cache().is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_off_thread() {
    let dir = fixture("thread");
    let command = RenderingCommand::headless();
    let mut loader = loader(&command, EvictionPolicy::Never);

    let path = dir.join("a.obj");
    let data = ::std::thread::spawn(move || {
        let importer = ObjImporter::new();
        ModelLoader::parse(&importer, &path, &Default::default())
    })
    .join()
    .unwrap()
    .unwrap();

    assert_eq!(data.images.len(), 1);
    assert_eq!(command.statistics().vertex_buffer_uploads, 0);

    let model = loader.upload(data).unwrap();
    assert_eq!(model.meshes().len(), 1);
    assert_eq!(command.statistics().texture_uploads, 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn eviction_on_scene_unload() {
    let dir = fixture("eviction");
    let command = RenderingCommand::headless();

    let mut desc = SceneDescriptor::default();
    desc.objects.push(ObjectDescriptor {
        name: "a".into(),
        source: Some(ModelSource::File(dir.join("a.obj"))),
        ..Default::default()
    });

    for &(policy, cached) in &[(EvictionPolicy::Never, 1), (EvictionPolicy::OnSceneUnload, 0)] {
        let loader = loader(&command, policy);
        let mut manager = SceneManager::new(loader, SceneParams::default(), LightingParams::default());

        manager.load_scene(&desc).unwrap();
        assert_eq!(manager.loader().cache().len(), 1);

        manager.unload_scene();
        assert_eq!(manager.loader().cache().len(), cached);
    }

    let _ = fs::remove_dir_all(&dir);
}
